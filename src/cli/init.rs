use dialoguer::Input;

use pocketbook::error::Result;
use pocketbook::settings::{load_settings, save_settings, settings_path, shellexpand_path};
use pocketbook::workbook::open_workbook;

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if !settings_path().exists() {
        // First run: ask where the monthly exports live
        let chosen: String = Input::new()
            .with_prompt("Data directory")
            .default(settings.data_dir.clone())
            .interact_text()?;
        settings.data_dir = shellexpand_path(chosen.trim());
    }

    let resolved = settings.data_path();
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(settings.exports_dir())?;
    save_settings(&settings)?;
    open_workbook(&settings.workbook_path())?;

    println!("Initialized pocketbook at {}", resolved.display());
    println!(
        "Drop monthly exports there as {}",
        settings.file_pattern.replace("{month}", "<month>")
    );
    Ok(())
}
