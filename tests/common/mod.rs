//! Shared fixture for integration tests: a bundle directory, an OTP root and
//! a bin directory standing in for `PATH`.
#![allow(dead_code)]

use beam_script_patcher::Config;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const VALGRIND: &str = "valgrind_beamasm_update.escript";
pub const ELIXIR: &str = "elixir";

pub struct TestTree {
    pub temp: TempDir,
    pub bundle: PathBuf,
    pub root: PathBuf,
    pub bin: PathBuf,
}

impl TestTree {
    /// Bundle holds both sources; `bin/elixir` is an installed, older launcher.
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let bundle = temp.path().join("bundle");
        let root = temp.path().join("otp");
        let bin = temp.path().join("bin");
        fs::create_dir_all(&bundle).unwrap();
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&bin).unwrap();

        fs::write(
            bundle.join(VALGRIND),
            "#!/usr/bin/env escript\nmain(_) -> ok.\n",
        )
        .unwrap();
        fs::write(bundle.join(ELIXIR), "#!/bin/sh\n# patched launcher v1\n").unwrap();
        write_with_mode(&bin.join(ELIXIR), "#!/bin/sh\n# stock launcher v0\n", 0o755);

        Self {
            temp,
            bundle,
            root,
            bin,
        }
    }

    pub fn config(&self) -> Config {
        Config::new(&self.root, &self.bundle).with_search_path(self.bin.as_os_str())
    }

    pub fn valgrind_target(&self) -> PathBuf {
        self.root.join("scripts").join(VALGRIND)
    }

    pub fn elixir_target(&self) -> PathBuf {
        self.bin.join(ELIXIR)
    }
}

pub fn write_with_mode(path: &Path, content: &str, mode: u32) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

pub fn mode_of(path: &Path) -> u32 {
    fs::metadata(path).unwrap().permissions().mode() & 0o7777
}
