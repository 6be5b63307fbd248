//! The sandbox executor's public operations: `compile` and `run` (spec
//! §4.2). Classification of container exit codes into [`JudgeError`]
//! variants lives here; the [`ContainerEngine`] only reports raw exit
//! codes and logs.

use std::sync::Arc;

use judge_types::{JudgeError, Processor};

use crate::engine::{ContainerEngine, ContainerSpec};
use crate::policy::ContainerPolicy;
use crate::workdir::WorkDir;

pub struct Executor {
    engine: Arc<dyn ContainerEngine>,
    policy: ContainerPolicy,
}

impl Executor {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self {
            engine,
            policy: ContainerPolicy::default(),
        }
    }

    pub fn with_policy(engine: Arc<dyn ContainerEngine>, policy: ContainerPolicy) -> Self {
        Self { engine, policy }
    }

    /// Compiles the source already written into `work_dir`. A no-op for
    /// interpreted processors. On a non-zero container exit, returns
    /// `CompileError` carrying the container's combined logs and exit
    /// code; compilation happens exactly once per evaluation, so callers
    /// must not call this more than once per job.
    pub async fn compile(&self, work_dir: &WorkDir, processor: &Processor) -> Result<(), JudgeError> {
        if !processor.needs_compile {
            return Ok(());
        }
        let command = (processor.compile_cmd)(&work_dir.path_str());
        if command.is_empty() {
            return Ok(());
        }

        let source = work_dir.path().join(processor.code_filename);
        if !source.exists() {
            return Err(JudgeError::FileNotFound(source.display().to_string()));
        }

        let outcome = self
            .engine
            .run(ContainerSpec {
                image: processor.image.to_string(),
                command,
                work_dir: work_dir.path().to_path_buf(),
                policy: self.policy,
            })
            .await?;

        if outcome.exit_code != 0 {
            return Err(JudgeError::CompileError {
                logs: outcome.logs,
                exit_code: outcome.exit_code,
            });
        }
        Ok(())
    }

    /// Runs the compiled/interpreted program against whatever `input.txt`
    /// the caller has already written into `work_dir`. Returns the
    /// program's captured stdout and elapsed wall-clock seconds.
    pub async fn run(
        &self,
        work_dir: &WorkDir,
        processor: &Processor,
        timeout_sec: u64,
    ) -> Result<(String, f64), JudgeError> {
        let source = work_dir.path().join(processor.code_filename);
        if !source.exists() {
            return Err(JudgeError::FileNotFound(source.display().to_string()));
        }

        let command = (processor.final_cmd)(&work_dir.path_str(), timeout_sec);
        let outcome = self
            .engine
            .run(ContainerSpec {
                image: processor.image.to_string(),
                command,
                work_dir: work_dir.path().to_path_buf(),
                policy: self.policy,
            })
            .await?;

        if outcome.exit_code != 0 {
            return Err(JudgeError::from_exit_code(outcome.exit_code, outcome.logs));
        }

        let output_path = work_dir.path().join("output.txt");
        let output = tokio::fs::read_to_string(&output_path)
            .await
            .map_err(|_| JudgeError::FileNotFound(output_path.display().to_string()))?;

        let time_path = work_dir.path().join("time.txt");
        let time_raw = tokio::fs::read_to_string(&time_path)
            .await
            .map_err(|_| JudgeError::FileNotFound(time_path.display().to_string()))?;
        let elapsed: f64 = time_raw
            .trim()
            .parse()
            .map_err(|_| JudgeError::Unknown(format!("unparseable elapsed time: {time_raw:?}")))?;

        Ok((output, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ContainerOutcome;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// A fake engine that writes the scripted `output.txt`/`time.txt`
    /// into the job's actual work directory (so `Executor::run` reads
    /// something real) and returns a scripted exit code, without ever
    /// spawning a container.
    struct ScriptedEngine {
        exit_code: i32,
        output: String,
        elapsed: f64,
        logs: String,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl ContainerEngine for ScriptedEngine {
        async fn run(&self, spec: ContainerSpec) -> Result<ContainerOutcome, JudgeError> {
            *self.calls.lock().unwrap() += 1;
            if self.exit_code == 0 {
                tokio::fs::write(spec.work_dir.join("output.txt"), &self.output)
                    .await
                    .unwrap();
                tokio::fs::write(spec.work_dir.join("time.txt"), self.elapsed.to_string())
                    .await
                    .unwrap();
            }
            Ok(ContainerOutcome {
                exit_code: self.exit_code,
                logs: self.logs.clone(),
            })
        }
    }

    fn cpp_compile(work_dir: &str) -> String {
        format!("g++ -o {work_dir}/main {work_dir}/main.cpp")
    }

    fn cpp_final(work_dir: &str, timeout_sec: u64) -> String {
        format!("timeout {timeout_sec} {work_dir}/main < {work_dir}/input.txt > {work_dir}/output.txt")
    }

    fn python_final(work_dir: &str, timeout_sec: u64) -> String {
        format!("timeout {timeout_sec} python3 {work_dir}/main.py < {work_dir}/input.txt > {work_dir}/output.txt")
    }

    fn cpp_processor() -> Processor {
        Processor {
            id: "c++17",
            image: "judge/gcc13:latest",
            code_filename: "main.cpp",
            needs_compile: true,
            compile_cmd: cpp_compile,
            final_cmd: cpp_final,
        }
    }

    fn python_processor() -> Processor {
        Processor {
            id: "python3",
            image: "judge/python3.12:latest",
            code_filename: "main.py",
            needs_compile: false,
            compile_cmd: |_| String::new(),
            final_cmd: python_final,
        }
    }

    #[tokio::test]
    async fn successful_run_returns_output_and_elapsed_time() {
        let base = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::create(base.path()).await.unwrap();
        tokio::fs::write(work_dir.path().join("main.cpp"), "int main(){}")
            .await
            .unwrap();

        let engine = Arc::new(ScriptedEngine {
            exit_code: 0,
            output: "6".to_string(),
            elapsed: 0.01,
            logs: String::new(),
            calls: Mutex::new(0),
        });
        let executor = Executor::new(engine);
        let (output, elapsed) = executor.run(&work_dir, &cpp_processor(), 2).await.unwrap();
        assert_eq!(output, "6");
        assert_eq!(elapsed, 0.01);
    }

    #[tokio::test]
    async fn timeout_exit_code_maps_to_time_limit_exceeded() {
        let base = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::create(base.path()).await.unwrap();
        tokio::fs::write(work_dir.path().join("main.cpp"), "int main(){}")
            .await
            .unwrap();

        let engine = Arc::new(ScriptedEngine {
            exit_code: 124,
            output: String::new(),
            elapsed: 0.0,
            logs: String::new(),
            calls: Mutex::new(0),
        });
        let executor = Executor::new(engine);
        let err = executor.run(&work_dir, &cpp_processor(), 1).await.unwrap_err();
        assert!(matches!(err, JudgeError::TimeLimitExceeded));
    }

    #[tokio::test]
    async fn compile_failure_short_circuits_with_compile_error() {
        let base = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::create(base.path()).await.unwrap();
        tokio::fs::write(work_dir.path().join("main.cpp"), "not valid c++")
            .await
            .unwrap();

        let engine = Arc::new(ScriptedEngine {
            exit_code: 1,
            output: String::new(),
            elapsed: 0.0,
            logs: "syntax error".to_string(),
            calls: Mutex::new(0),
        });
        let executor = Executor::new(engine);
        let err = executor.compile(&work_dir, &cpp_processor()).await.unwrap_err();
        match err {
            JudgeError::CompileError { logs, exit_code } => {
                assert_eq!(logs, "syntax error");
                assert_eq!(exit_code, 1);
            }
            other => panic!("expected CompileError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn compile_is_a_noop_for_interpreted_processors() {
        let base = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::create(base.path()).await.unwrap();
        tokio::fs::write(work_dir.path().join("main.py"), "print(1)")
            .await
            .unwrap();

        let python = python_processor();

        let engine = Arc::new(ScriptedEngine {
            exit_code: 0,
            output: String::new(),
            elapsed: 0.0,
            logs: String::new(),
            calls: Mutex::new(0),
        });
        let executor = Executor::new(engine.clone());
        executor.compile(&work_dir, &python).await.unwrap();
        assert_eq!(*engine.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_source_file_raises_file_not_found() {
        let base = tempfile::tempdir().unwrap();
        let work_dir = WorkDir::create(base.path()).await.unwrap();

        let engine = Arc::new(ScriptedEngine {
            exit_code: 0,
            output: String::new(),
            elapsed: 0.0,
            logs: String::new(),
            calls: Mutex::new(0),
        });
        let executor = Executor::new(engine);
        let err = executor.run(&work_dir, &cpp_processor(), 1).await.unwrap_err();
        assert!(matches!(err, JudgeError::FileNotFound(_)));
    }
}
