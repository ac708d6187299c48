//! Phase-diagram sweep demo.
//!
//! Builds an Ising or ANNNI Hamiltonian grid, trains the VQE over it with
//! either schedule, and reports the estimated against the exact ground
//! energies per grid point.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;

use spinphase_circuit::Ansatz;
use spinphase_demos::{print_header, print_result, print_section, print_success};
use spinphase_ham::HamiltonianGrid;
use spinphase_vqe::losses::batched_mean_fidelity;
use spinphase_vqe::{TrainConfig, Vqe, save};

#[derive(Parser, Debug)]
#[command(name = "sweep")]
#[command(about = "Train a VQE across a spin-chain phase diagram")]
struct Args {
    /// Chain model (ising, annni)
    #[arg(short, long, default_value = "ising")]
    model: String,

    /// Number of qubits
    #[arg(short = 'n', long, default_value = "6")]
    qubits: usize,

    /// Number of κ lattice points (annni only)
    #[arg(long, default_value = "4")]
    n_kappas: usize,

    /// Number of h lattice points
    #[arg(long, default_value = "8")]
    n_hs: usize,

    /// Maximum frustration ratio κ (annni only)
    #[arg(long, default_value = "1.0")]
    kappa_max: f64,

    /// Maximum transverse field h
    #[arg(long, default_value = "2.0")]
    h_max: f64,

    /// Epochs per grid point
    #[arg(short, long, default_value = "2000")]
    epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value = "0.01")]
    lr: f64,

    /// Regularization weight
    #[arg(long, default_value = "0.0")]
    reg: f64,

    /// Train sequentially with warm starts instead of batched
    #[arg(long)]
    recycle: bool,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Save the trained engine to this path
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    print_header("spinphase VQE sweep");

    let (grid, ansatz) = match args.model.as_str() {
        "ising" => (
            HamiltonianGrid::ising(args.qubits, args.n_hs, args.h_max)?,
            Ansatz::IsingChain,
        ),
        "annni" => (
            HamiltonianGrid::annni(
                args.qubits,
                args.n_kappas,
                args.n_hs,
                args.kappa_max,
                args.h_max,
            )?,
            Ansatz::Annni,
        ),
        other => bail!("unknown model '{other}' (expected ising or annni)"),
    };

    print_result("model", &args.model);
    print_result("qubits", args.qubits);
    print_result("grid points", grid.n_states());

    let mut vqe = Vqe::new(grid, ansatz)?;
    if let Some(seed) = args.seed {
        vqe = vqe.with_seed(seed);
    }
    print_result("parameters per point", vqe.n_params());

    print_section("training");
    let cfg = TrainConfig {
        lr: args.lr,
        n_epochs: args.epochs,
        reg: args.reg,
        recycle: args.recycle,
        ..TrainConfig::default()
    };
    vqe.train(&cfg).context("training failed")?;
    print_success("training complete");

    print_section("results");
    let energies = vqe.energies().expect("populated by train");
    let states = vqe.states().expect("populated by train");
    let true_e = vqe.grid().true_e().clone();

    println!("  {:>8} {:>8} {:>12} {:>12} {:>10}", "κ", "h", "E(vqe)", "E(exact)", "ΔE");
    for i in 0..energies.len() {
        let (kappa, h) = vqe.grid().params_at(i);
        println!(
            "  {:>8.3} {:>8.3} {:>12.6} {:>12.6} {:>10.2e}",
            kappa,
            h,
            energies[i],
            true_e[i],
            energies[i] - true_e[i],
        );
    }

    let mean_f = batched_mean_fidelity(vqe.grid().true_states().view(), states.view());
    print_result("mean fidelity vs exact", format!("{mean_f:.4}"));

    if let Some(path) = &args.save {
        save(&vqe, path).context("saving blob")?;
        print_success(&format!("saved to {}", path.display()));
    }

    Ok(())
}
