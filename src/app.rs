//! Root view controller: owns the upload/loading/report state and decides
//! which of the four screens is showing.

use std::path::Path;

use anyhow::{anyhow, Result};

use crate::client::AutopsyApi;
use crate::error::SubmitError;
use crate::export;
use crate::logging::{self, obj, v_str, Domain};
use crate::report::AutopsyReport;
use crate::upload::{FileSelection, FileSlot, SelectOutcome, UploadFile};
use crate::views::report::ReportView;
use crate::views::upload::UploadView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Upload,
    Loading,
    Report,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Landing => "landing",
            Screen::Upload => "upload",
            Screen::Loading => "loading",
            Screen::Report => "report",
        }
    }
}

#[derive(Debug, Default)]
pub struct App {
    files: FileSelection,
    loading: bool,
    report: Option<AutopsyReport>,
    error: Option<String>,
    show_upload: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loading wins over everything; a report wins over the upload form.
    pub fn screen(&self) -> Screen {
        if self.loading {
            Screen::Loading
        } else if self.report.is_some() {
            Screen::Report
        } else if self.show_upload {
            Screen::Upload
        } else {
            Screen::Landing
        }
    }

    pub fn files(&self) -> &FileSelection {
        &self.files
    }

    pub fn report(&self) -> Option<&AutopsyReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn transition<F: FnOnce(&mut Self)>(&mut self, change: F) {
        let from = self.screen();
        change(self);
        let to = self.screen();
        if from != to {
            logging::log_transition(from.as_str(), to.as_str());
        }
    }

    /// Landing → upload.
    pub fn get_started(&mut self) {
        self.transition(|app| app.show_upload = true);
    }

    pub fn select_file(&mut self, slot: FileSlot, path: &Path) -> Result<SelectOutcome> {
        let outcome = self.files.select_path(slot, path)?;
        if outcome == SelectOutcome::Ignored {
            logging::warn(
                Domain::Upload,
                "ignored_selection",
                obj(&[
                    ("field", v_str(slot.field())),
                    ("path", v_str(&path.to_string_lossy())),
                    ("msg", v_str("only .csv files are accepted")),
                ]),
            );
        }
        Ok(outcome)
    }

    pub fn set_file(&mut self, slot: FileSlot, file: UploadFile) -> SelectOutcome {
        self.files.set(slot, file)
    }

    /// Validate the selection and enter the loading screen. Fails without
    /// touching the network when a file is missing.
    ///
    /// Any report on screen is dropped first, so a failed run lands on the
    /// upload form with its error rather than on the previous report.
    pub fn start_analysis(&mut self) -> Result<(), SubmitError> {
        if let Err(err) = self.files.complete() {
            let message = err.user_message();
            self.transition(|app| {
                app.report = None;
                app.show_upload = true;
                app.error = Some(message);
            });
            logging::warn(
                Domain::Upload,
                "validation_failed",
                obj(&[("missing", serde_json::json!(self.files.missing()))]),
            );
            return Err(err);
        }
        self.transition(|app| {
            app.report = None;
            app.show_upload = true;
            app.loading = true;
            app.error = None;
        });
        Ok(())
    }

    /// The one outstanding request of an analysis run.
    pub async fn request(&self, api: &dyn AutopsyApi) -> Result<AutopsyReport, SubmitError> {
        let files = self.files.complete()?;
        api.run_autopsy(files).await
    }

    pub fn finish_analysis(&mut self, result: Result<AutopsyReport, SubmitError>) {
        self.transition(|app| {
            app.loading = false;
            match result {
                Ok(report) => {
                    logging::info(
                        Domain::View,
                        "report_ready",
                        obj(&[("severity", v_str(&report.executive_summary.severity))]),
                    );
                    app.report = Some(report);
                }
                Err(err) => app.error = Some(err.user_message()),
            }
        });
    }

    /// Validate, submit, and land on either the report or the upload form
    /// with an error.
    pub async fn analyze(&mut self, api: &dyn AutopsyApi) -> Result<(), SubmitError> {
        self.start_analysis()?;
        let result = self.request(api).await;
        let outcome = match &result {
            Ok(_) => Ok(()),
            Err(err) => Err(err.clone()),
        };
        self.finish_analysis(result);
        outcome
    }

    /// "New Analysis": drop the report and all three selections and go back
    /// to an empty upload form.
    pub fn reset(&mut self) {
        self.transition(|app| {
            app.files.clear();
            app.report = None;
            app.error = None;
            app.loading = false;
            app.show_upload = true;
        });
    }

    /// Back to the landing screen with everything cleared.
    pub fn go_home(&mut self) {
        self.transition(|app| {
            *app = App::default();
        });
    }

    pub fn upload_view(&self) -> UploadView {
        UploadView::project(&self.files, self.error.as_deref())
    }

    pub fn report_view(&self) -> Option<ReportView> {
        self.report.as_ref().map(ReportView::project)
    }

    pub fn export_pdf(&self, path: &Path) -> Result<()> {
        let view = self
            .report_view()
            .ok_or_else(|| anyhow!("no report to export yet"))?;
        export::export_pdf(&view, path)
    }
}
