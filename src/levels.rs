use std::fs;
use std::io;
use std::path::PathBuf;

/// Where numbered levels come from. Level numbers start at 1.
pub trait LevelSource {
    fn exists(&self, number: usize) -> bool;

    fn read(&self, number: usize) -> io::Result<String>;
}

/// A directory of `Level<N>.txt` files.
#[derive(Debug, Clone)]
pub struct LevelDirectory {
    root: PathBuf,
}

impl LevelDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LevelDirectory { root: root.into() }
    }

    pub fn path(&self, number: usize) -> PathBuf {
        self.root.join(format!("Level{}.txt", number))
    }
}

impl LevelSource for LevelDirectory {
    fn exists(&self, number: usize) -> bool {
        self.path(number).is_file()
    }

    fn read(&self, number: usize) -> io::Result<String> {
        fs::read_to_string(self.path(number))
    }
}

/// Levels held in memory, level 1 first.
#[derive(Debug, Clone, Default)]
pub struct LevelList {
    levels: Vec<String>,
}

impl LevelList {
    pub fn new<I, T>(levels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        LevelList {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl LevelSource for LevelList {
    fn exists(&self, number: usize) -> bool {
        (1..=self.levels.len()).contains(&number)
    }

    fn read(&self, number: usize) -> io::Result<String> {
        number
            .checked_sub(1)
            .and_then(|index| self.levels.get(index))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no level {}", number)))
    }
}
