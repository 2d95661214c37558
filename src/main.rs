// src/main.rs
use anyhow::{Context, Result};
use swift2::system::{self, NativeObjectCounts};
use swift2::BindingConfig;
// Reports what the loaded SWIFT library offers.
// Usage: swift2-info [config.json] [model_id]
fn main() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path.ends_with(".json") => {
            BindingConfig::from_json_file(&path).with_context(|| format!("reading configuration {path}"))?
        }
        Some(model_id) => {
            swift2::initialise(&BindingConfig::from_env()).context("loading the SWIFT library")?;
            return print_model_variables(&model_id);
        }
        None => BindingConfig::from_env(),
    };
    swift2::initialise(&config).with_context(|| {
        format!("loading {}", config.library_file_name().to_string_lossy())
    })?;
    println!("runoff models: {}", system::runoff_model_ids()?.join(", "));
    println!(
        "parameterisation strategies: {}",
        system::known_parameterisation_strategies()?.join(", ")
    );
    println!("aggregation strategies: {}", system::known_aggregation_strategies()?.join(", "));
    println!("target selectors: {}", system::known_target_selector_types()?.join(", "));
    println!("default max threads: {}", system::default_max_threads()?);
    let counts = NativeObjectCounts::current()?;
    println!("live native objects: {}", serde_json::to_string(&counts)?);
    if let Some(model_id) = args.next() {
        print_model_variables(&model_id)?;
    }
    Ok(())
}
fn print_model_variables(model_id: &str) -> Result<()> {
    let vars = system::runoff_model_var_ids(model_id)
        .with_context(|| format!("listing variables of {model_id}"))?;
    println!("{model_id} variables: {}", vars.join(", "));
    Ok(())
}
