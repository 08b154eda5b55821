use std::time::Instant;

use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{debug, trace};

use crate::descriptor::Descriptor;
use crate::error::FinderError;
use crate::filter::{FilterChain, Verdict};
use crate::results::{Results, ScanStats};

// ---------------------------------------------------------------------------
// PoolConfig
// ---------------------------------------------------------------------------

/// Pool parameters passed from the builder to the engine.
///
/// `pub(crate)` — callers set these via `FinderBuilder::workers()`.
pub(crate) struct PoolConfig {
    pub workers: usize,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What a worker reports for each descriptor it took off the intake.
enum Outcome {
    Matched(Descriptor),
    Rejected,
    Failed,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Apply `chain` to every descriptor on a fixed pool of worker threads.
///
/// One producer feeds an unbuffered intake, `workers` threads pull from it and
/// report one [`Outcome`] per descriptor, and the calling thread is the only
/// collector. Completion is counted, not inferred from channels closing: the
/// collector stops once it has heard about every input descriptor.
pub(crate) fn run(
    descriptors: Vec<Descriptor>,
    chain: &FilterChain,
    config: &PoolConfig,
) -> Result<Results, FinderError> {
    let start = Instant::now();
    let total = descriptors.len();
    let workers = config.workers.min(total);

    if total == 0 {
        return Ok(Results {
            descriptors: Vec::new(),
            stats: ScanStats::compute(0, 0, 0, 0, 0, start.elapsed()),
        });
    }

    let (work_tx, work_rx) = bounded::<Descriptor>(0);
    let (outcome_tx, outcome_rx) = bounded::<Outcome>(0);

    let tally = crossbeam::thread::scope(|s| {
        for worker_id in 0..workers {
            let work_rx = work_rx.clone();
            let outcome_tx = outcome_tx.clone();
            s.spawn(move |_| worker(worker_id, work_rx, outcome_tx, chain));
        }

        s.spawn(move |_| {
            for d in descriptors {
                if work_tx.send(d).is_err() {
                    break; // every worker is gone
                }
            }
        });

        // Only worker clones may keep the outcome channel open
        drop(work_rx);
        drop(outcome_tx);

        collect(outcome_rx, total)
    })
    .map_err(|_| FinderError::ThreadPool("filter worker panicked".into()))?;

    let Tally { matched, rejected, failed } = tally;
    let stats = ScanStats::compute(total, matched.len(), rejected, failed, workers, start.elapsed());

    Ok(Results { descriptors: matched, stats })
}

fn worker(id: usize, work_rx: Receiver<Descriptor>, outcome_tx: Sender<Outcome>, chain: &FilterChain) {
    trace!(worker = id, "filter worker started");

    while let Ok(mut d) = work_rx.recv() {
        let outcome = match chain.evaluate(&mut d) {
            Verdict::Match => Outcome::Matched(d),
            Verdict::Reject => {
                trace!(worker = id, path = %d.absolute_path().display(), "rejected");
                Outcome::Rejected
            }
            Verdict::Error { filter, error } => {
                debug!(
                    worker = id,
                    path = %d.absolute_path().display(),
                    filter,
                    error = %error,
                    "filter failed, excluding entry"
                );
                Outcome::Failed
            }
        };

        if outcome_tx.send(outcome).is_err() {
            break; // collector gone
        }
    }

    trace!(worker = id, "filter worker stopped");
}

struct Tally {
    matched:  Vec<Descriptor>,
    rejected: usize,
    failed:   usize,
}

fn collect(outcome_rx: Receiver<Outcome>, total: usize) -> Tally {
    let mut tally = Tally {
        matched:  Vec::new(),
        rejected: 0,
        failed:   0,
    };
    let mut remaining = total;

    while remaining > 0 {
        match outcome_rx.recv() {
            Ok(Outcome::Matched(d)) => tally.matched.push(d),
            Ok(Outcome::Rejected) => tally.rejected += 1,
            Ok(Outcome::Failed) => tally.failed += 1,
            // All workers exited early; only a panic gets us here
            Err(_) => break,
        }
        remaining -= 1;
    }

    tally
}
