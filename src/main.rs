//! Material creator - template inspector and demo driver
//!
//! Usage: `material-creator <template.json> [<material> <type> [<slot> <image>]]`
//!
//! Loads and validates the template and lists its material types. With a
//! material name and type it builds the material in an in-memory scene,
//! optionally assigns a texture, and prints the resulting graph as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use log::error;

use material_creator::nodes::Scene;
use material_creator::{MaterialCreator, Settings, Template};

struct Args {
    template: PathBuf,
    material: Option<(String, String)>,
    texture: Option<(String, PathBuf)>,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args().skip(1);
    let template = PathBuf::from(args.next()?);
    let rest: Vec<String> = args.collect();
    match rest.as_slice() {
        [] => Some(Args {
            template,
            material: None,
            texture: None,
        }),
        [name, type_name] => Some(Args {
            template,
            material: Some((name.clone(), type_name.clone())),
            texture: None,
        }),
        [name, type_name, slot, image] => Some(Args {
            template,
            material: Some((name.clone(), type_name.clone())),
            texture: Some((slot.clone(), PathBuf::from(image))),
        }),
        _ => None,
    }
}

fn print_template(template: &Template) {
    for material_type in template.material_types() {
        println!("{} (suffix '{}')", material_type.name, material_type.suffix);
        for slot in &material_type.required_slots {
            println!("  {} [required] {}", slot.slot_name, slot.description);
        }
        for slot in &material_type.optional_slots {
            println!("  {} [optional] {}", slot.slot_name, slot.description);
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default()?;
    let template = Template::from_path(&args.template)?;
    print_template(&template);

    let Some((name, type_name)) = args.material else {
        return Ok(());
    };

    let scene = Scene::new(&settings);
    let mut creator = MaterialCreator::new(scene, template, settings);
    let report = creator.create_material(&name, &type_name)?;
    for failure in &report.failures {
        error!("Slot '{}': {}", failure.slot, failure.error);
    }

    if let Some((slot, image)) = args.texture {
        let assignment = creator.assign_texture(&slot, &image)?;
        println!(
            "Assigned {} to {} node(s) of slot '{}'",
            image.display(),
            assignment.nodes.len(),
            slot
        );
    }

    let active = creator.active_material().unwrap_or_default().to_string();
    if let Some(material) = creator.library().material(&active) {
        println!("{}", serde_json::to_string_pretty(material)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(args) = parse_args() else {
        eprintln!("Usage: material-creator <template.json> [<material> <type> [<slot> <image>]]");
        return ExitCode::from(2);
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
