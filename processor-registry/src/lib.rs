//! The processor registry (C1): a static table mapping a processor id to
//! its container image, canonical source filename, and compile/run command
//! templates.
//!
//! Adding a language is one entry in [`REGISTRY`]. The table is immutable
//! and loaded once; nothing here touches the filesystem or a container
//! engine — that's the sandbox executor's job.

use judge_types::Processor;

fn timeout_wrapper(work_dir: &str, timeout_sec: u64) -> String {
    format!("/usr/bin/time -o {work_dir}/time.txt -f '%e' timeout {timeout_sec}")
}

fn cpp17_compile(work_dir: &str) -> String {
    format!("g++ -std=c++17 -O2 -o {work_dir}/main {work_dir}/main.cpp")
}

fn cpp17_final(work_dir: &str, timeout_sec: u64) -> String {
    format!(
        "{} {work_dir}/main < {work_dir}/input.txt > {work_dir}/output.txt",
        timeout_wrapper(work_dir, timeout_sec)
    )
}

fn python3_compile(_work_dir: &str) -> String {
    String::new()
}

fn python3_final(work_dir: &str, timeout_sec: u64) -> String {
    format!(
        "{} python3 {work_dir}/main.py < {work_dir}/input.txt > {work_dir}/output.txt",
        timeout_wrapper(work_dir, timeout_sec)
    )
}

fn java_compile(work_dir: &str) -> String {
    format!("javac -d {work_dir} {work_dir}/Main.java")
}

fn java_final(work_dir: &str, timeout_sec: u64) -> String {
    format!(
        "{} java -cp {work_dir} Main < {work_dir}/input.txt > {work_dir}/output.txt",
        timeout_wrapper(work_dir, timeout_sec)
    )
}

/// The static processor table. Keys are the user-facing processor
/// identifiers accepted by `/execute` and `/evaluate`.
pub static REGISTRY: &[Processor] = &[
    Processor {
        id: "c++17",
        image: "judge/gcc13:latest",
        code_filename: "main.cpp",
        needs_compile: true,
        compile_cmd: cpp17_compile,
        final_cmd: cpp17_final,
    },
    Processor {
        id: "python3",
        image: "judge/python3.12:latest",
        code_filename: "main.py",
        needs_compile: false,
        compile_cmd: python3_compile,
        final_cmd: python3_final,
    },
    Processor {
        id: "java",
        image: "judge/openjdk21:latest",
        code_filename: "Main.java",
        needs_compile: true,
        compile_cmd: java_compile,
        final_cmd: java_final,
    },
];

/// Looks up a processor by id, returning `None` for an unrecognized id
/// (the caller maps that to `UnsupportedProcessor` / 400).
pub fn lookup(id: &str) -> Option<&'static Processor> {
    REGISTRY.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_processor_resolves_by_id() {
        for proc in REGISTRY {
            let found = lookup(proc.id).expect("processor must resolve by its own id");
            assert_eq!(found.id, proc.id);
        }
    }

    #[test]
    fn unknown_processor_id_resolves_to_none() {
        assert!(lookup("cobol-85").is_none());
    }

    #[test]
    fn interpreted_language_has_empty_compile_command() {
        let python = lookup("python3").unwrap();
        assert!(!python.needs_compile);
        assert_eq!((python.compile_cmd)("/tmp/job"), "");
    }

    #[test]
    fn compiled_language_has_nonempty_compile_command() {
        let cpp = lookup("c++17").unwrap();
        assert!(cpp.needs_compile);
        assert!((cpp.compile_cmd)("/tmp/job").contains("g++"));
    }

    #[test]
    fn final_command_redirects_stdin_stdout_and_records_time() {
        let cpp = lookup("c++17").unwrap();
        let cmd = (cpp.final_cmd)("/tmp/job", 2);
        assert!(cmd.contains("/tmp/job/input.txt"));
        assert!(cmd.contains("/tmp/job/output.txt"));
        assert!(cmd.contains("/tmp/job/time.txt"));
        assert!(cmd.contains("timeout 2"));
    }
}
