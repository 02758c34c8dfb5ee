use eframe::egui::{self, Color32, RichText, ScrollArea, TextEdit, Ui};
use egui_extras::DatePickerButton;

use crate::data::loader::SourceFormat;
use crate::state::{AppState, FilterForm, InputMethod};

// ---------------------------------------------------------------------------
// Login screen
// ---------------------------------------------------------------------------

/// Render the login form shown until the session is authenticated.
pub fn login_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.heading("Site Data Viewer");
        ui.label("Sign in to continue");
        ui.add_space(12.0);

        ui.label("Username");
        ui.add(TextEdit::singleline(&mut state.login.username).desired_width(220.0));
        ui.label("Password");
        let password = ui.add(
            TextEdit::singleline(&mut state.login.password)
                .password(true)
                .desired_width(220.0),
        );
        let enter = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.add_space(8.0);
        if ui.button("Login").clicked() || enter {
            state.submit_login();
        }

        if let Some(err) = &state.login.error {
            ui.add_space(4.0);
            ui.label(RichText::new(err).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel: sources and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: input method, loaded sources, filters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Sources");
    ui.separator();

    let mut method = state.input_method;
    egui::ComboBox::from_label("Input method")
        .selected_text(method.label())
        .show_ui(ui, |ui: &mut Ui| {
            for m in InputMethod::ALL {
                ui.selectable_value(&mut method, m, m.label());
            }
        });
    state.set_input_method(method);

    match state.input_method {
        InputMethod::Upload => {
            if ui.button("Upload Excel files…").clicked() {
                open_files_dialog(state);
            }
        }
        InputMethod::Manual => {
            if ui.button("Reload").clicked() {
                state.load_manual();
            }
        }
    }

    for name in &state.source_names {
        ui.small(name);
    }
    if let Some(palette) = &state.palette {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for (label, color) in palette.legend_entries() {
                ui.label(RichText::new(format!("■ {label}")).color(color));
            }
        });
    }

    ui.add_space(8.0);
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate the form inside the closures.
    let Some(choices) = state.table.as_ref().map(|t| t.choices.clone()) else {
        ui.label("No data loaded.");
        return;
    };
    let today = state.today;
    let before = state.form.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let form = &mut state.form;

            ui.label("Enter site number:");
            ui.text_edit_singleline(&mut form.site);
            ui.add_space(4.0);

            ui.checkbox(&mut form.date_enabled, "Select date:");
            ui.add_enabled_ui(form.date_enabled, |ui: &mut Ui| {
                ui.add(
                    DatePickerButton::new(&mut form.date)
                        .id_salt("filter_date")
                        .format("%d/%m/%Y"),
                );
            });
            ui.add_space(4.0);

            choice_box(ui, "Select Region:", &mut form.region, &choices.regions);
            choice_box(
                ui,
                "Select Cluster Manager (L1):",
                &mut form.cluster_manager,
                &choices.cluster_managers,
            );
            choice_box(
                ui,
                "Select Area Manager (L2):",
                &mut form.area_manager,
                &choices.area_managers,
            );
            choice_box(
                ui,
                "Select Area Executive (L3):",
                &mut form.area_executive,
                &choices.area_executives,
            );

            ui.add_space(8.0);
            if ui.button("Clear filters").clicked() {
                *form = FilterForm::new(today);
            }
        });

    if state.form != before {
        state.refilter();
    }
}

/// Drop-down with an empty "any" entry followed by `options`.
fn choice_box(ui: &mut Ui, label: &str, selected: &mut String, options: &[String]) {
    ui.label(label);
    let shown = if selected.is_empty() {
        "Any".to_string()
    } else {
        selected.clone()
    };
    egui::ComboBox::from_id_salt(label)
        .selected_text(shown)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(selected, String::new(), "Any");
            for option in options {
                ui.selectable_value(selected, option.clone(), option);
            }
        });
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let uploading = state.input_method == InputMethod::Upload;
            if ui.add_enabled(uploading, egui::Button::new("Open…")).clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.view.is_empty(), egui::Button::new("Export…"))
                .clicked()
            {
                save_export_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Log out").clicked() {
                state.logout();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows loaded, {} visible",
                table.len(),
                state.view.len()
            ));
            ui.separator();
        }

        if let Some(user) = state.session.user() {
            ui.label(format!("Signed in as {user}"));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Upload Excel files")
        .add_filter("Supported files", &SourceFormat::EXTENSIONS)
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("OpenDocument", &["ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_files();

    if let Some(paths) = files {
        state.load_uploads(&paths);
    }
}

pub fn save_export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download data as Excel")
        .set_file_name(state.config.export_file_name.as_str())
        .add_filter("Excel", &["xlsx"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.save_export(&path) {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
