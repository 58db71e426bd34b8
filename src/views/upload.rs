use crate::upload::{FileSelection, FileSlot};

pub const TIPS: [&str; 4] = [
    "All three files must have the same column structure",
    "CSV files should be properly formatted with headers",
    "Ensure your production data represents before/after failure periods",
    "Analysis typically completes in 10-30 seconds",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerView {
    pub slot: FileSlot,
    pub label: &'static str,
    pub description: &'static str,
    /// Chosen file name, if any.
    pub chosen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub pickers: Vec<PickerView>,
    pub error: Option<String>,
    /// Submit button is live only when all three slots are filled.
    pub can_submit: bool,
}

impl UploadView {
    pub fn project(files: &FileSelection, error: Option<&str>) -> Self {
        let pickers = FileSlot::ALL
            .iter()
            .map(|slot| PickerView {
                slot: *slot,
                label: slot.label(),
                description: slot.description(),
                chosen: files.get(*slot).map(|f| f.file_name.clone()),
            })
            .collect();
        Self {
            pickers,
            error: error.map(str::to_string),
            can_submit: files.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadFile;
    use std::path::Path;

    #[test]
    fn test_projection_tracks_selection() {
        let mut files = FileSelection::new();
        files.set(
            FileSlot::ProdNew,
            UploadFile::from_bytes(Path::new("/tmp/after.csv"), b"x\n1\n".to_vec()),
        );
        let view = UploadView::project(&files, Some("Please upload all three CSV files"));
        assert_eq!(view.pickers.len(), 3);
        assert_eq!(view.pickers[0].label, "Training Data");
        assert_eq!(view.pickers[0].chosen, None);
        assert_eq!(view.pickers[2].chosen.as_deref(), Some("after.csv"));
        assert!(!view.can_submit);
        assert_eq!(view.error.as_deref(), Some("Please upload all three CSV files"));
    }
}
