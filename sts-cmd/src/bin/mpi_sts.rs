//! `mpi_sts <input_file> <output_file>`: the Distributed Coordinator's
//! launcher half (§4.5). No MPI runtime exists anywhere in this lineage, so
//! the scatter/gather contract is realized over real OS processes: split
//! the input into one contiguous byte range per worker, spawn the `sts`
//! binary in iterate-only mode once per worker, wait for all of them, merge
//! the per-worker p-value files in rank order, then run one assess-only
//! pass of `sts` over the union.

use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use strum::IntoEnumIterator;
use sts_lib::{Test, BYTE_SIZE, DEFAULT_ITERATION_BITS, MAX_WORKER_PROCS};

fn main() -> Result<()> {
    let mut args = env::args_os().skip(1);
    let input_path: PathBuf = args
        .next()
        .context("usage: mpi_sts <input_file> <output_file>")?
        .into();
    let output_path: PathBuf = args
        .next()
        .context("usage: mpi_sts <input_file> <output_file>")?
        .into();

    let sts_binary = sts_binary_path()?;

    let file = fs::File::open(&input_path)
        .with_context(|| format!("failed to open input file {}", input_path.display()))?;
    let input = unsafe { Mmap::map(&file) }
        .with_context(|| format!("failed to memory-map {}", input_path.display()))?;

    let iteration_bytes = DEFAULT_ITERATION_BITS / BYTE_SIZE;
    let total_bytes = input.len();

    let num_procs = (total_bytes / iteration_bytes).min(MAX_WORKER_PROCS);
    if num_procs == 0 {
        bail!(
            "not enough bytes: need at least {iteration_bytes} bytes for one worker, got {total_bytes}"
        );
    }

    let per_group = total_bytes / (iteration_bytes * num_procs);

    let staging = tempfile::tempdir().context("failed to create staging directory")?;

    let mut children = Vec::with_capacity(num_procs);
    let mut worker_pval_dirs = Vec::with_capacity(num_procs);

    for rank in 0..num_procs {
        let start = rank * per_group * iteration_bytes;
        let len = per_group * iteration_bytes;
        let slice = &input[start..start + len];

        let worker_dir = staging.path().join(format!("worker-{rank}"));
        fs::create_dir_all(&worker_dir)?;
        let worker_input = worker_dir.join("input.bin");
        fs::write(&worker_input, slice)
            .with_context(|| format!("failed to stage worker {rank}'s input slice"))?;

        let pval_dir = worker_dir.join("pval");
        fs::create_dir_all(&pval_dir)?;

        let child = Command::new(&sts_binary)
            .arg("-m")
            .arg("i")
            .arg("-i")
            .arg(per_group.to_string())
            .arg("-d")
            .arg(&pval_dir)
            .arg(&worker_input)
            .spawn()
            .with_context(|| format!("failed to spawn worker {rank}"))?;

        children.push((rank, child));
        worker_pval_dirs.push(pval_dir);
    }

    // Barrier: wait for every worker before gathering. Faults are fatal -
    // the first nonzero exit aborts the whole job (§5).
    for (rank, mut child) in children {
        let status = child
            .wait()
            .with_context(|| format!("failed to wait on worker {rank}"))?;
        if !status.success() {
            bail!("worker {rank} exited with {status}");
        }
    }

    let merged_dir = staging.path().join("merged");
    fs::create_dir_all(&merged_dir)?;
    merge_worker_outputs(&worker_pval_dirs, &merged_dir)?;

    let results_dir = staging.path().join("results");
    let status = Command::new(&sts_binary)
        .arg("-m")
        .arg("a")
        .arg("-d")
        .arg(&merged_dir)
        .arg("-w")
        .arg(&results_dir)
        .status()
        .context("failed to spawn the assess-only pass")?;
    if !status.success() {
        bail!("assess-only pass exited with {status}");
    }

    let report = results_dir.join("finalAnalysisReport.txt");
    fs::copy(&report, &output_path).with_context(|| {
        format!(
            "failed to copy the final report to {}",
            output_path.display()
        )
    })?;

    Ok(())
}

/// Concatenates every worker's per-test p-value file, in rank order, into
/// one merged file per test. Workers' files are just appended, not parsed -
/// the binary p-value format (§6) is already a flat sequence of doubles, so
/// concatenation alone produces the union in rank order.
fn merge_worker_outputs(worker_dirs: &[PathBuf], merged_dir: &Path) -> Result<()> {
    for test in Test::iter() {
        let merged_path = merged_dir.join(format!("{test}.pval"));
        let mut merged = fs::File::create(&merged_path)?;

        for dir in worker_dirs {
            let worker_path = dir.join(format!("{test}.pval"));
            if let Ok(bytes) = fs::read(&worker_path) {
                merged.write_all(&bytes)?;
            }
        }
    }

    Ok(())
}

fn sts_binary_path() -> Result<PathBuf> {
    let mut path = env::current_exe().context("failed to locate the current executable")?;
    path.pop();
    path.push(if cfg!(windows) { "sts.exe" } else { "sts" });
    Ok(path)
}
