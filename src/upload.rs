//! The three CSV inputs and their selection state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::error::SubmitError;

/// One of the three file pickers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSlot {
    Train,
    ProdOld,
    ProdNew,
}

impl FileSlot {
    pub const ALL: [FileSlot; 3] = [FileSlot::Train, FileSlot::ProdOld, FileSlot::ProdNew];

    /// Multipart form field name.
    pub fn field(&self) -> &'static str {
        match self {
            FileSlot::Train => "train",
            FileSlot::ProdOld => "prod_old",
            FileSlot::ProdNew => "prod_new",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileSlot::Train => "Training Data",
            FileSlot::ProdOld => "Production (Old)",
            FileSlot::ProdNew => "Production (New)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FileSlot::Train => "Baseline model training data",
            FileSlot::ProdOld => "Data before model failure",
            FileSlot::ProdNew => "Data after model failure",
        }
    }

    pub fn from_field(raw: &str) -> Option<Self> {
        match raw.trim() {
            "train" => Some(FileSlot::Train),
            "prod_old" | "prod-old" | "old" => Some(FileSlot::ProdOld),
            "prod_new" | "prod-new" | "new" => Some(FileSlot::ProdNew),
            _ => None,
        }
    }
}

/// A chosen CSV file, read into memory at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl UploadFile {
    pub fn read(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        Ok(Self::from_bytes(path, contents))
    }

    pub fn from_bytes(path: &Path, contents: Vec<u8>) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            file_name,
            path: path.to_path_buf(),
            contents,
        }
    }

    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.contents);
        hex::encode(hasher.finalize())
    }
}

pub fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    /// Not a `.csv` path; the slot keeps its previous file.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    train: Option<UploadFile>,
    prod_old: Option<UploadFile>,
    prod_new: Option<UploadFile>,
}

/// All three files, borrowed for one submission.
#[derive(Debug, Clone, Copy)]
pub struct CompleteSelection<'a> {
    pub train: &'a UploadFile,
    pub prod_old: &'a UploadFile,
    pub prod_new: &'a UploadFile,
}

impl<'a> CompleteSelection<'a> {
    pub fn parts(&self) -> [(FileSlot, &'a UploadFile); 3] {
        [
            (FileSlot::Train, self.train),
            (FileSlot::ProdOld, self.prod_old),
            (FileSlot::ProdNew, self.prod_new),
        ]
    }
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: FileSlot) -> Option<&UploadFile> {
        self.slot_ref(slot).as_ref()
    }

    fn slot_ref(&self, slot: FileSlot) -> &Option<UploadFile> {
        match slot {
            FileSlot::Train => &self.train,
            FileSlot::ProdOld => &self.prod_old,
            FileSlot::ProdNew => &self.prod_new,
        }
    }

    fn slot_mut(&mut self, slot: FileSlot) -> &mut Option<UploadFile> {
        match slot {
            FileSlot::Train => &mut self.train,
            FileSlot::ProdOld => &mut self.prod_old,
            FileSlot::ProdNew => &mut self.prod_new,
        }
    }

    /// Select an already-loaded file. Non-CSV names are ignored.
    pub fn set(&mut self, slot: FileSlot, file: UploadFile) -> SelectOutcome {
        if !is_csv_path(&file.path) {
            return SelectOutcome::Ignored;
        }
        *self.slot_mut(slot) = Some(file);
        SelectOutcome::Selected
    }

    /// Read `path` from disk and select it. The extension is checked
    /// before touching the filesystem.
    pub fn select_path(&mut self, slot: FileSlot, path: &Path) -> Result<SelectOutcome> {
        if !is_csv_path(path) {
            return Ok(SelectOutcome::Ignored);
        }
        let file = UploadFile::read(path)?;
        Ok(self.set(slot, file))
    }

    pub fn missing(&self) -> Vec<&'static str> {
        FileSlot::ALL
            .iter()
            .filter(|slot| self.get(**slot).is_none())
            .map(|slot| slot.field())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn complete(&self) -> Result<CompleteSelection<'_>, SubmitError> {
        match (&self.train, &self.prod_old, &self.prod_new) {
            (Some(train), Some(prod_old), Some(prod_new)) => Ok(CompleteSelection {
                train,
                prod_old,
                prod_new,
            }),
            _ => Err(SubmitError::MissingFiles {
                missing: self.missing(),
            }),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        FileSlot::ALL.iter().all(|slot| self.get(*slot).is_none())
    }
}
