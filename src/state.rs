use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};

use crate::color::ProviderPalette;
use crate::config::AppConfig;
use crate::data::export::export_xlsx;
use crate::data::filter::{filter_table, FilterCriteria};
use crate::data::loader::{self, IngestError};
use crate::data::model::{FilteredTable, SiteTable, DISPLAY_DATE_FORMAT};
use crate::session::Session;

pub const NO_SOURCES_MESSAGE: &str =
    "Please upload Excel files or select Manual Input to proceed.";
pub const NO_MATCHES_MESSAGE: &str = "No data found for the given filters.";

// ---------------------------------------------------------------------------
// Input method
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMethod {
    /// Files picked by the user; labels come from file names.
    Upload,
    /// The configured fixed sources.
    Manual,
}

impl InputMethod {
    pub const ALL: [InputMethod; 2] = [InputMethod::Upload, InputMethod::Manual];

    pub fn label(self) -> &'static str {
        match self {
            InputMethod::Upload => "Upload Files",
            InputMethod::Manual => "Manual Input",
        }
    }
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Message of the last rejected attempt.
    pub error: Option<String>,
}

/// Raw filter widget values. Empty strings mean "any".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterForm {
    pub site: String,
    pub date_enabled: bool,
    pub date: NaiveDate,
    pub region: String,
    pub cluster_manager: String,
    pub area_manager: String,
    pub area_executive: String,
}

impl FilterForm {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            site: String::new(),
            date_enabled: false,
            date,
            region: String::new(),
            cluster_manager: String::new(),
            area_manager: String::new(),
            area_executive: String::new(),
        }
    }

    pub fn criteria(&self) -> FilterCriteria {
        let opt = |s: &String| (!s.is_empty()).then(|| s.clone());
        FilterCriteria {
            site: opt(&self.site),
            date: self.date_enabled.then_some(self.date),
            region: opt(&self.region),
            cluster_manager: opt(&self.cluster_manager),
            area_manager: opt(&self.area_manager),
            area_executive: opt(&self.area_executive),
        }
    }
}

/// What the central panel should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    NoSources,
    NoMatches,
    Rows(usize),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Access state of this session; nothing else is shown until it is
    /// authenticated.
    pub session: Session,
    pub login: LoginForm,

    pub input_method: InputMethod,

    /// Names of the sources behind `table`.
    pub source_names: Vec<String>,

    /// Merged table (None until sources are loaded).
    pub table: Option<SiteTable>,

    pub form: FilterForm,

    /// Result of the current filters (cached).
    pub view: FilteredTable,

    pub palette: Option<ProviderPalette>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub today: NaiveDate,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let today = Local::now().date_naive();
        Self {
            config,
            session: Session::new(),
            login: LoginForm::default(),
            input_method: InputMethod::Upload,
            source_names: Vec::new(),
            table: None,
            form: FilterForm::new(today),
            view: FilteredTable::default(),
            palette: None,
            status_message: None,
            today,
        }
    }

    // -- Session --

    /// Check the login form against the configured credentials.
    pub fn submit_login(&mut self) {
        let result = self.session.login(
            &self.config.credentials,
            &self.login.username,
            &self.login.password,
        );
        self.login.password.clear();

        match result {
            Ok(()) => {
                self.login.error = None;
                if self.input_method == InputMethod::Manual {
                    self.load_manual();
                }
            }
            Err(e) => self.login.error = Some(e.to_string()),
        }
    }

    /// End the session and drop everything loaded in it.
    pub fn logout(&mut self) {
        self.session.logout();
        self.login = LoginForm::default();
        self.clear_table();
        self.form = FilterForm::new(self.today);
        self.status_message = None;
    }

    // -- Loading --

    pub fn set_input_method(&mut self, method: InputMethod) {
        if method == self.input_method {
            return;
        }
        self.input_method = method;
        self.clear_table();
        self.status_message = None;
        if method == InputMethod::Manual {
            self.load_manual();
        }
    }

    /// Load the configured fixed sources.
    pub fn load_manual(&mut self) {
        let sources: Vec<(String, PathBuf)> = self
            .config
            .manual_sources
            .iter()
            .map(|s| (s.label.clone(), s.path.clone()))
            .collect();
        let names = sources
            .iter()
            .map(|(_, path)| path.display().to_string())
            .collect();
        self.apply_load(names, loader::load_paths(&sources));
    }

    /// Load user-picked files. An empty pick leaves the current table alone.
    pub fn load_uploads(&mut self, paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }
        let names = paths.iter().map(|p| p.display().to_string()).collect();
        self.apply_load(names, loader::load_uploads(paths));
    }

    fn apply_load(&mut self, names: Vec<String>, result: Result<SiteTable, IngestError>) {
        match result {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows from {} source(s) with columns {:?}",
                    table.len(),
                    names.len(),
                    table.column_names
                );
                self.set_table(names, table);
            }
            Err(e) => {
                let e = anyhow::Error::new(e);
                log::error!("Failed to load sources: {e:#}");
                self.clear_table();
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly merged table and re-run the filters.
    pub fn set_table(&mut self, source_names: Vec<String>, table: SiteTable) {
        // Drop drop-down selections the new table cannot satisfy.
        let choices = &table.choices;
        for (selected, options) in [
            (&mut self.form.region, &choices.regions),
            (&mut self.form.cluster_manager, &choices.cluster_managers),
            (&mut self.form.area_manager, &choices.area_managers),
            (&mut self.form.area_executive, &choices.area_executives),
        ] {
            if !selected.is_empty() && !options.contains(selected) {
                selected.clear();
            }
        }

        self.palette = Some(ProviderPalette::new(&table.providers()));
        self.source_names = source_names;
        self.table = Some(table);
        self.status_message = None;
        self.refilter();
    }

    fn clear_table(&mut self) {
        self.table = None;
        self.source_names.clear();
        self.palette = None;
        self.view = FilteredTable::default();
    }

    // -- Filtering --

    /// Keep the date inside the selectable range. `today` wins when the
    /// configured earliest date lies in the future.
    pub fn clamp_date(&mut self) {
        self.form.date = self.form.date.max(self.config.earliest_date).min(self.today);
    }

    /// Recompute `view` after a filter change.
    pub fn refilter(&mut self) {
        self.clamp_date();
        self.view = match &self.table {
            Some(table) => {
                let criteria = self.form.criteria();
                let view = filter_table(table, &criteria);
                log::debug!("{} of {} rows match {criteria:?}", view.len(), table.len());
                view
            }
            None => FilteredTable::default(),
        };
    }

    pub fn view_status(&self) -> ViewStatus {
        match &self.table {
            None => ViewStatus::NoSources,
            Some(_) if self.view.is_empty() => ViewStatus::NoMatches,
            Some(_) => ViewStatus::Rows(self.view.len()),
        }
    }

    /// Heading above the result table.
    pub fn caption(&self) -> String {
        let date = if self.form.date_enabled {
            self.form.date.format(DISPLAY_DATE_FORMAT).to_string()
        } else {
            "any date".to_string()
        };
        format!("Data for site number: {} on {date}", self.form.site)
    }

    // -- Export --

    /// Write the current view as an `.xlsx` file.
    pub fn save_export(&self, path: &Path) -> anyhow::Result<()> {
        let bytes = export_xlsx(&self.view).context("encoding export")?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {} rows to {}", self.view.len(), path.display());
        Ok(())
    }
}
