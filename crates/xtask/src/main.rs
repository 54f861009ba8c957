use std::collections::BTreeMap;

use anyhow::Context;
use serde::Deserialize;

/// Workspace crates each crate may depend on.
const ALLOWED_INTERNAL: [(&str, &[&str]); 4] = [
    ("questforge-domain", &[]),
    ("questforge-shared", &["questforge-domain"]),
    (
        "questforge-engine",
        &["questforge-domain", "questforge-shared"],
    ),
    ("xtask", &[]),
];

/// Runtime and transport crates the pure crates must not pull in.
const FORBIDDEN_IN_PURE: [&str; 4] = ["tokio", "axum", "reqwest", "tracing-subscriber"];
const PURE_CRATES: [&str; 2] = ["questforge-domain", "questforge-shared"];

#[derive(Debug, Deserialize)]
struct Metadata {
    packages: Vec<Package>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Deserialize)]
struct Dependency {
    name: String,
    kind: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check"),
    }
}

fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed")
    }

    let metadata: Metadata =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata")?;
    let violations = check_packages(&metadata.packages);

    if violations.is_empty() {
        println!("arch-check: {} crates OK", metadata.packages.len());
        return Ok(());
    }
    for violation in &violations {
        eprintln!("arch-check: {violation}");
    }
    anyhow::bail!("{} dependency rule violation(s)", violations.len())
}

fn check_packages(packages: &[Package]) -> Vec<String> {
    let allowed: BTreeMap<&str, &[&str]> = ALLOWED_INTERNAL.into_iter().collect();
    let mut violations = Vec::new();

    for package in packages {
        let Some(permitted) = allowed.get(package.name.as_str()) else {
            violations.push(format!("{} is not a known workspace crate", package.name));
            continue;
        };
        let is_pure = PURE_CRATES.contains(&package.name.as_str());

        // Dev-dependencies are free to reach further.
        for dep in package
            .dependencies
            .iter()
            .filter(|d| d.kind.as_deref() != Some("dev"))
        {
            if allowed.contains_key(dep.name.as_str()) && !permitted.contains(&dep.name.as_str())
            {
                violations.push(format!("{} must not depend on {}", package.name, dep.name));
            }
            if is_pure && FORBIDDEN_IN_PURE.contains(&dep.name.as_str()) {
                violations.push(format!(
                    "{} must stay runtime-free but depends on {}",
                    package.name, dep.name
                ));
            }
        }
    }

    violations
}
