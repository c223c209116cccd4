#![allow(dead_code)]

// Fixtures for publish tests: a site directory with a fake generator script,
// and a destination clone whose `origin` is a local bare repository.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use tempfile::TempDir;

pub struct Fixture {
    _tmp: TempDir,
    pub site: PathBuf,
    pub dest: PathBuf,
    pub remote: PathBuf,
    pub generator: PathBuf,
}

/// Run git in `dir` and return trimmed stdout, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn git");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).expect("utf8").trim().to_string()
}

pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write");
}

/// Sorted (relative path, content) pairs of all files under `root`, skipping `.git`.
pub fn files(root: &Path) -> Vec<(String, String)> {
    fn visit(root: &Path, dir: &Path, out: &mut Vec<(String, String)>) {
        for entry in fs::read_dir(dir).expect("read_dir") {
            let entry = entry.expect("entry");
            let path = entry.path();
            if entry.file_name() == ".git" {
                continue;
            }
            if path.is_dir() {
                visit(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).expect("prefix");
                out.push((
                    rel.to_string_lossy().into_owned(),
                    fs::read_to_string(&path).expect("read"),
                ));
            }
        }
    }
    let mut out = Vec::new();
    visit(root, root, &mut out);
    out.sort();
    out
}

pub fn commit_count(repo: &Path) -> usize {
    git(repo, &["rev-list", "--count", "HEAD"])
        .parse()
        .expect("count")
}

impl Fixture {
    /// Destination holds `index.html` (old) and `old.html`, pushed to `origin`.
    /// The generator writes `index.html` (new) and `about.html` into `public/`.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path();
        let site = root.join("site");
        let dest = root.join("blog");
        let remote = root.join("remote.git");
        fs::create_dir_all(&site).expect("mkdir site");
        fs::create_dir_all(&dest).expect("mkdir dest");

        git(root, &["init", "--quiet", "--bare", "remote.git"]);

        git(&dest, &["init", "--quiet"]);
        git(&dest, &["config", "user.name", "Test"]);
        git(&dest, &["config", "user.email", "test@example.com"]);
        git(&dest, &["config", "commit.gpgsign", "false"]);
        write(&dest.join("index.html"), "old index");
        write(&dest.join("old.html"), "old page");
        git(&dest, &["add", "--all"]);
        git(&dest, &["commit", "--quiet", "-m", "initial"]);
        git(
            &dest,
            &["remote", "add", "origin", remote.to_str().expect("utf8")],
        );
        git(&dest, &["push", "--quiet", "-u", "origin", "HEAD"]);

        let generator = site.join("gen.sh");
        let fixture = Self {
            _tmp: tmp,
            site,
            dest,
            remote,
            generator,
        };
        fixture.set_generator(
            "mkdir -p public\nprintf 'new index' > public/index.html\nprintf 'about' > public/about.html",
        );
        fixture
    }

    /// Replace the fake generator's body.
    pub fn set_generator(&self, body: &str) {
        write(&self.generator, &format!("set -e\n{body}\n"));
    }

    /// Generator command line; the script runs through `sh` so it is never exec'd directly.
    pub fn generator_cmd(&self) -> String {
        format!("sh {}", self.generator.display())
    }

    /// Remote's latest commit subject on the pushed branch.
    pub fn remote_subject(&self) -> String {
        git(&self.remote, &["log", "-1", "--format=%s"])
    }
}
