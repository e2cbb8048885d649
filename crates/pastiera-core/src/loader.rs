use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, RwLock};
use std::thread;

use tracing::{debug, debug_span, warn};

use crate::ngram::NgramLanguageModel;
use crate::store::SharedStore;
use crate::user_learning::UserLearningStore;

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

enum Job {
    Load {
        model: Arc<NgramLanguageModel>,
        generation: u64,
    },
    Persist {
        learning: Arc<RwLock<UserLearningStore>>,
        store: SharedStore,
    },
    /// Signals the sender once every earlier job has run.
    Barrier(mpsc::Sender<()>),
}

// ---------------------------------------------------------------------------
// BackgroundLoader
// ---------------------------------------------------------------------------

/// Runs table loads and learning persistence on one worker thread so the
/// typing path never touches disk or parses data.
pub struct BackgroundLoader {
    tx: mpsc::Sender<Job>,
    load_gen: Arc<AtomicU64>,
}

impl BackgroundLoader {
    pub fn new() -> Self {
        let load_gen = Arc::new(AtomicU64::new(0));
        let (tx, rx) = mpsc::channel::<Job>();
        {
            let gen = Arc::clone(&load_gen);
            thread::Builder::new()
                .name("pastiera-loader".into())
                .spawn(move || worker(rx, gen))
                .expect("failed to spawn loader worker");
        }
        Self { tx, load_gen }
    }

    /// Install the dictionary's base tables into `model`. Any load submitted
    /// earlier and not yet installed is abandoned.
    pub fn submit_load(&self, model: Arc<NgramLanguageModel>) {
        let generation = self.load_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.tx.send(Job::Load { model, generation });
    }

    /// Abandon every outstanding load (e.g. the locale changed).
    pub fn cancel_loads(&self) {
        self.load_gen.fetch_add(1, Ordering::SeqCst);
    }

    pub fn submit_persist(&self, learning: Arc<RwLock<UserLearningStore>>, store: SharedStore) {
        let _ = self.tx.send(Job::Persist { learning, store });
    }

    /// Block until every job submitted so far has been handled.
    pub fn wait_idle(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        if self.tx.send(Job::Barrier(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }
}

impl Default for BackgroundLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

fn worker(rx: mpsc::Receiver<Job>, gen: Arc<AtomicU64>) {
    while let Ok(job) = rx.recv() {
        // Drain: everything queued runs as one batch. Only the latest load
        // can still be current, and a persist is redundant when a later one
        // writes the same learning store to the same backend.
        let mut batch = vec![job];
        while let Ok(next) = rx.try_recv() {
            batch.push(next);
        }
        let last_load = batch.iter().rposition(|j| matches!(j, Job::Load { .. }));
        let superseded: Vec<bool> = (0..batch.len())
            .map(|i| persist_repeated_later(&batch, i))
            .collect();

        for (i, job) in batch.into_iter().enumerate() {
            match job {
                Job::Load { model, generation } if Some(i) == last_load => {
                    run_load(&model, generation, &gen);
                }
                Job::Persist { learning, store } if !superseded[i] => {
                    run_persist(&learning, &store);
                }
                Job::Barrier(done) => {
                    let _ = done.send(());
                }
                _ => {}
            }
        }
    }
}

fn persist_repeated_later(batch: &[Job], i: usize) -> bool {
    let Job::Persist { learning, store } = &batch[i] else {
        return false;
    };
    batch[i + 1..].iter().any(|later| match later {
        Job::Persist {
            learning: l,
            store: s,
        } => Arc::ptr_eq(learning, l) && Arc::ptr_eq(store, s),
        _ => false,
    })
}

fn run_load(model: &NgramLanguageModel, generation: u64, gen: &AtomicU64) {
    let _span = debug_span!("load_ngrams", generation).entered();

    // Check staleness before doing work
    if generation != gen.load(Ordering::SeqCst) {
        debug!("load superseded before start");
        return;
    }

    let Some(tables) = model.dictionary().ngram_tables() else {
        debug!("dictionary ships no n-gram tables");
        return;
    };

    // Check staleness after the expensive part
    if generation != gen.load(Ordering::SeqCst) {
        debug!("load superseded, discarding tables");
        return;
    }
    model.load_ngrams(tables);
}

fn run_persist(learning: &RwLock<UserLearningStore>, store: &SharedStore) {
    let _span = debug_span!("persist_learning").entered();

    // The read guard spans the write so a concurrent clear cannot be undone.
    let Ok(learning) = learning.read() else {
        warn!("user learning lock poisoned, skipping persist");
        return;
    };
    let encoded = match learning.encode() {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!("failed to encode user learning: {e}");
            return;
        }
    };
    let Ok(mut store) = store.lock() else {
        warn!("store lock poisoned, skipping persist");
        return;
    };
    if let Err(e) = encoded.write_to(&mut *store) {
        warn!("failed to persist user learning: {e}");
    }
}
