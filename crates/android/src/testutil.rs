//! Recording fakes shared by the step tests

use crate::fetch::Fetcher;
use aabkit_cli::prompt::CredentialProvider;
use aabkit_core::config::{ConfigSchema, PipelineConfig};
use aabkit_core::platform::HostOs;
use aabkit_core::process::{CommandResult, CommandRunner, Invocation};
use aabkit_core::{Error, Result};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

/// Linux config rooted in a temp dir: `<root>/project`, `<root>/home`, empty `PATH`
///
/// The project directory is created with a minimal `pubspec.yaml`.
pub fn test_config(root: &Path) -> PipelineConfig {
    let config = PipelineConfig::new(
        root.join("project"),
        root.join("home"),
        HostOs::Linux,
        ConfigSchema::default(),
    );
    fs::create_dir_all(&config.project_root).unwrap();
    fs::write(config.pubspec_path(), b"name: app\n").unwrap();
    config
}

type Hook = Box<dyn Fn(&Invocation)>;

/// Records every invocation instead of running it
///
/// Commands are matched by "line": the program's file name followed by its
/// arguments, e.g. `sdkmanager --version`. A key matches a line equal to it
/// or starting with it followed by a space.
#[derive(Default)]
pub struct FakeRunner {
    java: Option<String>,
    failures: Vec<(String, i32)>,
    hooks: Vec<(String, Hook)>,
    calls: RefCell<Vec<Invocation>>,
    fed: RefCell<Vec<String>>,
}

fn line_of(invocation: &Invocation) -> String {
    let program = Path::new(invocation.program())
        .file_name()
        .map_or_else(|| invocation.program().to_string(), |n| n.to_string_lossy().into_owned());
    std::iter::once(program.as_str())
        .chain(invocation.argv())
        .collect::<Vec<_>>()
        .join(" ")
}

fn matches(line: &str, key: &str) -> bool {
    line == key || line.starts_with(&format!("{key} "))
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `java -version` succeed with `banner` on stderr
    pub fn with_java(mut self, banner: &str) -> Self {
        self.java = Some(banner.to_string());
        self
    }

    /// Exit with `code` for commands matching `key`
    pub fn fail(mut self, key: &str, code: i32) -> Self {
        self.failures.push((key.to_string(), code));
        self
    }

    /// Run `effect` whenever a command matching `key` executes
    pub fn on(mut self, key: &str, effect: impl Fn(&Invocation) + 'static) -> Self {
        self.hooks.push((key.to_string(), Box::new(effect)));
        self
    }

    /// Lines of every invocation, in order
    pub fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(line_of).collect()
    }

    /// Every invocation, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Stdin passed to `feed`, in order
    pub fn fed_input(&self) -> Vec<String> {
        self.fed.borrow().clone()
    }

    fn record(&self, invocation: &Invocation) -> i32 {
        self.calls.borrow_mut().push(invocation.clone());
        let line = line_of(invocation);

        for (key, effect) in &self.hooks {
            if matches(&line, key) {
                effect(invocation);
            }
        }

        self.failures
            .iter()
            .find(|(key, _)| matches(&line, key))
            .map_or(0, |(_, code)| *code)
    }
}

fn result(exit_code: i32, stdout: &str, stderr: &str) -> CommandResult {
    CommandResult {
        success: exit_code == 0,
        exit_code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

impl CommandRunner for FakeRunner {
    fn stream(&self, invocation: &Invocation) -> Result<i32> {
        Ok(self.record(invocation))
    }

    fn capture(&self, invocation: &Invocation) -> Result<CommandResult> {
        let code = self.record(invocation);
        if invocation.program() == "java" {
            return match &self.java {
                Some(banner) => Ok(result(code, "", banner)),
                None => Err(Error::command_not_found("java")),
            };
        }
        Ok(result(code, "", ""))
    }

    fn feed(&self, invocation: &Invocation, input: &[u8]) -> Result<CommandResult> {
        self.fed.borrow_mut().push(String::from_utf8_lossy(input).into_owned());
        Ok(result(self.record(invocation), "", ""))
    }
}

/// Serves canned bytes for known URLs and records every request
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, Vec<u8>>,
    requested: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), body);
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.requested.borrow_mut().push(url.to_string());
        let body = self
            .responses
            .get(url)
            .ok_or_else(|| Error::download(format!("Failed to download {url}: HTTP 404 Not Found")))?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, body)?;
        Ok(())
    }
}

/// Answers prompts from a fixed queue
pub struct FakePrompt {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<String>>,
}

impl FakePrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| (*a).to_string()).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn answer(&self, prompt: &str) -> Result<String> {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::invalid_input(format!("Unexpected prompt: {prompt}")))
    }
}

impl CredentialProvider for FakePrompt {
    fn secret(&self, prompt: &str) -> Result<String> {
        self.answer(prompt)
    }

    fn text(&self, prompt: &str) -> Result<String> {
        self.answer(prompt)
    }
}

/// In-memory zip with executable entries
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
    for (name, body) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// In-memory `.tar.xz` with executable entries
pub fn tar_xz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    let mut builder = tar::Builder::new(encoder);
    for (name, body) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, name, *body).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Write a stub shell script and mark it executable
pub fn executable(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"#!/bin/sh\nexit 0\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
