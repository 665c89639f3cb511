use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::SubscriberBuilder;
use voronoi::geom2::rand::{uniform_sites, Bounds2};
use voronoi::SweepCfg;

mod io;
mod output;
mod provenance;

use output::DiagramJson;
use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "voronoi-cli")]
#[command(about = "Voronoi diagrams of planar site sets")]
struct Cmd {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compute the diagram of a site file and write it as JSON
    Run {
        /// Sites: .csv / .parquet with x,y columns, or whitespace text
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write uniformly random sites
    Generate {
        #[arg(long)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Sites are drawn from [-half, half]²
        #[arg(long, default_value_t = 100.0)]
        half: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print version, code revision and default tolerances
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = match cmd.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Run { input, out } => run(&input, &out),
        Action::Generate {
            count,
            seed,
            half,
            out,
        } => generate(count, seed, half, &out),
        Action::Report => report(),
    }
}

fn run(input: &Path, out: &Path) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), "run");
    let sites = io::read_sites(input)?;
    let diagram = voronoi::compute(&sites).context("computing diagram")?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let doc = DiagramJson::from(&diagram);
    std::fs::write(out, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let stats = diagram.stats();
    let payload = Payload::new(
        "run",
        serde_json::json!({
            "sites": sites.len(),
            "vertices": stats.vertices,
            "edges": diagram.mesh().edge_count(),
            "stale_circles": stats.stale_circles,
            "degenerate_triples": stats.degenerate_triples,
            "duplicate_sites": stats.duplicate_sites
        }),
    )
    .with_input(input);
    write_sidecar(out, payload)?;
    Ok(())
}

fn generate(count: usize, seed: u64, half: f64, out: &Path) -> Result<()> {
    tracing::info!(count, seed, half, out = %out.display(), "generate");
    let sites = uniform_sites(count, Bounds2::centered(half), seed);
    io::write_sites(out, &sites)?;
    let payload = Payload::new(
        "generate",
        serde_json::json!({ "count": count, "seed": seed, "half": half }),
    );
    write_sidecar(out, payload)?;
    Ok(())
}

fn report() -> Result<()> {
    let cfg = SweepCfg::default();
    let obj = serde_json::json!({
        "tool": "voronoi-cli",
        "version": voronoi::VERSION,
        "code_rev": provenance::current_git_rev(),
        "sweep_cfg": {
            "eps_det": cfg.eps_det,
            "eps_time": cfg.eps_time,
            "eps_locate": cfg.eps_locate,
            "truncation_factor": cfg.truncation_factor
        }
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn generate_then_run_writes_json_and_sidecars() {
        let dir = tempdir().unwrap();
        let sites = dir.path().join("sites.csv");
        let out = dir.path().join("out/diagram.json");
        generate(25, 7, 10.0, &sites).unwrap();
        assert!(dir.path().join("sites.provenance.json").exists());

        run(&sites, &out).unwrap();
        let doc: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(doc["sites"].as_array().unwrap().len(), 25);
        assert_eq!(doc["cells"].as_array().unwrap().len(), 25);
        assert!(dir.path().join("out/diagram.provenance.json").exists());
    }

    #[test]
    fn cli_parses_subcommands() {
        let cmd = Cmd::try_parse_from(["voronoi-cli", "-v", "generate", "--count", "5", "--out", "a.txt"])
            .unwrap();
        assert_eq!(cmd.verbose, 1);
        match cmd.action {
            Action::Generate { count, seed, half, .. } => {
                assert_eq!(count, 5);
                assert_eq!(seed, 0);
                assert_eq!(half, 100.0);
            }
            _ => panic!("expected generate"),
        }
        assert!(Cmd::try_parse_from(["voronoi-cli", "run", "--input", "x.csv"]).is_err());
    }
}
