//! Print the transform for a recipe without contacting the service.
//!
//! Usage: `descriptor-dump [recipe] [--schema]`

use ams_encoding::Recipe;
use ams_models::{ResourceRequest, Transform};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--schema") {
        let schema = schemars::schema_for!(Transform);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let recipe = match args.first() {
        Some(name) => name.parse::<Recipe>()?,
        None => Recipe::default(),
    };

    let body = ResourceRequest::new(recipe.transform());
    eprintln!(
        "descriptor-dump: recipe={} transform={}",
        recipe,
        recipe.default_transform_name()
    );
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
