//! Build script for heron-bridge
//!
//! Validates the embedded heron.toml at compile time so a broken default
//! configuration never ships.

use std::fs;
use std::path::Path;

fn main() {
    validate_config();
}

/// Validate heron.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=heron.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("heron.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read heron.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in heron.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_converter(&config, &mut errors);
    validate_sensors(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in heron.toml                      ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate the [converter] section
fn validate_converter(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(converter) = config.get("converter") else {
        return;
    };

    if let Some(toml::Value::String(width)) = converter.get("address_width") {
        if !["standard", "extended"].contains(&width.as_str()) {
            errors.push("[converter] address_width must be 'standard' or 'extended'".into());
        }
    }
    if let Some(toml::Value::Integer(baud)) = converter.get("baudrate") {
        if *baud <= 0 {
            errors.push("[converter] baudrate must be positive".into());
        }
    }
}

/// Validate the [[sensors]] entries
fn validate_sensors(config: &toml::Value, errors: &mut Vec<String>) {
    let sensors = match config.get("sensors") {
        Some(toml::Value::Array(sensors)) if !sensors.is_empty() => sensors,
        _ => {
            errors.push("Missing [[sensors]] - at least one sensor is required".into());
            return;
        }
    };

    let mut seen = Vec::new();
    for (i, sensor) in sensors.iter().enumerate() {
        match sensor.get("id") {
            Some(toml::Value::Integer(id)) if (0..=63).contains(id) => {
                if seen.contains(id) {
                    errors.push(format!("[[sensors]] #{} duplicates node id {}", i, id));
                }
                seen.push(*id);
            }
            _ => errors.push(format!("[[sensors]] #{} needs an 'id' between 0 and 63", i)),
        }

        if sensor.get("name").and_then(|n| n.as_str()).is_none() {
            errors.push(format!("[[sensors]] #{} missing 'name'", i));
        }

        if let Some(toml::Value::String(variant)) = sensor.get("variant") {
            if !["infrared", "infrared_ultrasonic", "ir", "irus"].contains(&variant.as_str()) {
                errors.push(format!(
                    "[[sensors]] #{} variant must be 'infrared' or 'infrared_ultrasonic'",
                    i
                ));
            }
        }
    }
}
