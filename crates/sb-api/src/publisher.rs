use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use sb_compiler::{compile_source, CompileOptions};
use sb_core::{Script, ScriptError};
use sb_runtime::ExecutionContext;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where background compiles run.
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);
}

/// Runs every job on the calling thread before `execute` returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Spawns one worker thread per job. Finished workers are reaped on the next
/// `execute`, so a long editing session keeps only running ones.
#[derive(Debug, Default)]
pub struct ThreadExecutor {
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for every job started so far.
    pub fn join(&self) {
        let workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner));
        for worker in workers {
            settle(worker);
        }
    }

    /// Workers still running.
    pub fn pending(&self) -> usize {
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        reap(&mut workers);
        workers.len()
    }
}

impl Executor for ThreadExecutor {
    fn execute(&self, job: Job) {
        let worker = thread::spawn(job);
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        reap(&mut workers);
        workers.push(worker);
    }
}

fn reap(workers: &mut Vec<JoinHandle<()>>) {
    let (finished, running): (Vec<_>, Vec<_>) =
        workers.drain(..).partition(JoinHandle::is_finished);
    *workers = running;
    for worker in finished {
        settle(worker);
    }
}

fn settle(worker: JoinHandle<()>) {
    if worker.join().is_err() {
        log::warn!("compile worker panicked");
    }
}

/// A published compile result. `generation` 0 is the empty script a
/// publisher starts with.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    pub generation: u64,
    pub source: String,
    pub script: Arc<Script>,
}

impl CompiledScript {
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::new(Arc::clone(&self.script))
    }
}

#[derive(Debug)]
struct Shared {
    published: RwLock<Arc<CompiledScript>>,
    generation: AtomicU64,
    failure: Mutex<Option<(u64, ScriptError)>>,
}

impl Shared {
    /// Publishes `result` unless a newer submission superseded it.
    fn complete(&self, generation: u64, source: String, result: Result<Script, ScriptError>) {
        let mut published = self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if generation != self.generation.load(Ordering::SeqCst) || published.generation >= generation {
            log::debug!("dropping stale compile of generation {}", generation);
            return;
        }

        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(script) => {
                log::debug!("publishing generation {}", generation);
                *published = Arc::new(CompiledScript {
                    generation,
                    source,
                    script: Arc::new(script),
                });
                *failure = None;
            }
            Err(error) => {
                log::warn!("generation {} failed to compile: {}", generation, error);
                *failure = Some((generation, error));
            }
        }
    }
}

/// Holds the script every new execution context starts from and replaces
/// it as edits compile. Contexts already running keep the `Arc` they were
/// created with.
pub struct ScriptPublisher {
    shared: Arc<Shared>,
    executor: Arc<dyn Executor>,
    options: CompileOptions,
}

impl ScriptPublisher {
    pub fn new(executor: Arc<dyn Executor>, options: CompileOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                published: RwLock::new(Arc::new(CompiledScript {
                    generation: 0,
                    source: String::new(),
                    script: Arc::new(Script::default()),
                })),
                generation: AtomicU64::new(0),
                failure: Mutex::new(None),
            }),
            executor,
            options,
        }
    }

    /// Queues a compile of `source` and returns its generation.
    pub fn submit(&self, source: impl Into<String>) -> u64 {
        let source = source.into();
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = Arc::clone(&self.shared);
        let options = self.options.clone();
        self.executor.execute(Box::new(move || {
            let result = compile_source(&source, &options);
            shared.complete(generation, source, result);
        }));
        generation
    }

    /// Latest submitted generation, compiled or not.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Arc<CompiledScript> {
        Arc::clone(
            &self
                .shared
                .published
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Compile error of the latest submission, if it failed.
    pub fn last_error(&self) -> Option<ScriptError> {
        let failure = self.shared.failure.lock().unwrap_or_else(PoisonError::into_inner);
        match &*failure {
            Some((generation, error)) if *generation == self.generation() => Some(error.clone()),
            _ => None,
        }
    }
}
