use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": app.config_path.as_ref().map(|p| p.to_string_lossy().into_owned()),
                "config": app.config,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            match &app.config_path {
                Some(path) => println!("# {}", path.display()),
                None => println!("# defaults (no config file)"),
            }
            print!("{}", toml::to_string_pretty(&app.config)?);
        }
    }

    Ok(())
}
