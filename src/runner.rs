use std::thread;
use std::time::Instant;

use log::{info, warn};
use rand::Rng;

use crate::config::{self, Properties};
use crate::db::{self, Database};
use crate::stats::RunReport;
use crate::workload::{Operation, Workload};
use crate::{BenchError, Query, Result};

/// Runs one job against its configured backend and returns the merged
/// report.
///
/// The job owns a single database instance: `init` up front, worker
/// threads drive it concurrently through `&dyn Database`, `close` after
/// they join. A failed operation is counted and the run continues; a
/// failed `init` aborts the job, since nothing meaningful can be measured
/// against an unconfigured backend.
pub fn run_job(work_plan: &Properties, job: &Properties) -> Result<RunReport> {
    let job_name = job.require(config::JOB_NAME)?;
    let backend = job.require(config::JOB_DB)?;
    let workers = match job.get_u64(config::JOB_THREADS)? {
        Some(n) if n > 0 => n as usize,
        Some(_) => {
            return Err(BenchError::StringError(
                "Job thread count must be at least one".to_string(),
            ))
        }
        None => num_cpus::get(),
    };
    let workload = Workload::from_job(job)?;

    info!(
        "Job {}: backend {}, {} workers, {} records, {} operations",
        job_name, backend, workers, workload.record_count, workload.operation_count
    );

    let mut database = db::create_database(backend)?;
    if !database.init(work_plan, job).is_ok() {
        return Err(BenchError::StringError(format!(
            "Database init failed for job {}",
            job_name
        )));
    }

    let start = Instant::now();
    let database_ref: &dyn Database = database.as_ref();
    let mut report = thread::scope(|scope| -> Result<RunReport> {
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let workload = &workload;
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn_scoped(scope, move || {
                    run_worker(id as u64, workers as u64, database_ref, workload)
                })?;
            handles.push(handle);
        }

        let mut merged = RunReport::default();
        for handle in handles {
            let worker_report = handle.join().map_err(|_| {
                BenchError::StringError("Worker thread panicked".to_string())
            })?;
            merged.merge(&worker_report);
        }
        Ok(merged)
    })?;
    report.elapsed = start.elapsed();

    if !database.close().is_ok() {
        warn!("Database close failed for job {}", job_name);
    }

    Ok(report)
}

/// One worker's load and run phases.
fn run_worker(id: u64, workers: u64, database: &dyn Database, workload: &Workload) -> RunReport {
    let mut rng = rand::thread_rng();
    let mut report = RunReport::default();

    // Load phase: workers stripe the key space so every record is loaded
    // exactly once.
    let mut index = id;
    while index < workload.record_count {
        let query = Query::write(Workload::key_for(index), workload.generate_value(&mut rng));
        let start = Instant::now();
        let result = database.insert(&query);
        report.record(Operation::Insert, result, start.elapsed());
        index += workers;
    }

    // Run phase: this worker's share of the operation mix over random keys
    // in the loaded range.
    let share =
        workload.operation_count / workers + u64::from(id < workload.operation_count % workers);
    let key_space = workload.record_count.max(1);
    for _ in 0..share {
        let op = workload.choose(&mut rng);
        let key = Workload::key_for(rng.gen_range(0..key_space));
        let query = match op {
            Operation::Insert | Operation::Update => {
                Query::write(key, workload.generate_value(&mut rng))
            }
            Operation::Read | Operation::Delete => Query::lookup(key),
        };

        let start = Instant::now();
        let result = match op {
            Operation::Insert => database.insert(&query),
            Operation::Update => database.update(&query),
            Operation::Read => database.read(&query),
            Operation::Delete => database.delete(&query),
        };
        report.record(op, result, start.elapsed());
    }

    report
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sled_job(dir: &TempDir) -> Properties {
        let mut job = Properties::new();
        job.insert(config::JOB_NAME, "runner-test");
        job.insert(config::JOB_DB, "sled");
        job.insert(config::SLED_PATH, dir.path().to_str().unwrap());
        job.insert(config::JOB_THREADS, "2");
        job.insert(config::JOB_RECORDS, "10");
        job.insert(config::JOB_OPERATIONS, "20");
        job.insert(config::JOB_READ_RATIO, "1.0");
        job.insert(config::JOB_UPDATE_RATIO, "0.0");
        job.insert(config::JOB_VALUE_SIZE, "16");
        job
    }

    #[test]
    fn read_only_job_over_sled_backend_has_no_failures() {
        let dir = TempDir::new().unwrap();
        let report = run_job(&Properties::new(), &sled_job(&dir)).unwrap();

        assert_eq!(report.insert.count(), 10);
        assert_eq!(report.read.count(), 20);
        assert_eq!(report.total_failures(), 0);
        assert_eq!(report.total_ops(), 30);
    }

    #[test]
    fn job_without_backend_kind_is_rejected() {
        let mut job = Properties::new();
        job.insert(config::JOB_NAME, "no-backend");
        let err = run_job(&Properties::new(), &job).unwrap_err();
        assert!(matches!(err, BenchError::ConfigMissing(key) if key == config::JOB_DB));
    }

    #[test]
    fn zero_thread_count_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut job = sled_job(&dir);
        job.insert(config::JOB_THREADS, "0");
        assert!(run_job(&Properties::new(), &job).is_err());
    }

    #[test]
    fn init_failure_aborts_the_job() {
        // An HTTP job with no host configured: init fails before any
        // worker starts.
        let mut job = Properties::new();
        job.insert(config::JOB_NAME, "bad-init");
        job.insert(config::JOB_DB, "http");
        job.insert(config::JOB_THREADS, "1");
        assert!(run_job(&Properties::new(), &job).is_err());
    }
}
