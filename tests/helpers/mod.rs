//! Stand-ins for the java launcher and minisat.
//!
//! The scripts are written once per test binary. They find the scratch directory through the
//! artifact paths they are called with, log their command line to `fake.invocations` there and
//! take their output and exit code from `fake.*` files next to it. That way every test configures
//! its own tools by writing to its own scratch directory.
#![allow(dead_code)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use sugarsat::{Config, ConfigBuilder};
use tempfile::TempDir;

pub const MINISAT_STATS: &str = "restarts              : 1\n\
                                 conflicts             : 0              (0 /sec)\n\
                                 decisions             : 2              (0.00 % random) (1000 /sec)\n\
                                 propagations          : 4              (2000 /sec)\n\
                                 conflict literals     : 0              ( nan % deleted)\n\
                                 Memory used           : 18.00 MB\n\
                                 CPU time              : 0.004 s\n\
                                 \n";

/// The CNF the fake encoder writes.
pub const CNF: &str = "p cnf 2 1\n1 2 0\n";

/// The variable map the fake encoder writes.
pub const MAP: &str = "1 2\n";

const JAVA: &str = r#"#!/bin/sh
case "$3" in
    -encode)
        dir=$(dirname "$5")
        echo "java $*" >> "$dir/fake.invocations"
        printf 'p cnf 2 1\n1 2 0\n' > "$5"
        printf '1 2\n' > "$6"
        cat "$dir/fake.encoder.stdout"
        exit "$(cat "$dir/fake.encoder.code")"
        ;;
    -competition)
        dir=$(dirname "$6")
        echo "java $*" >> "$dir/fake.invocations"
        cat "$dir/fake.decoder.stdout"
        exit "$(cat "$dir/fake.decoder.code")"
        ;;
esac
exit 3
"#;

const MINISAT: &str = r#"#!/bin/sh
for last; do :; done
dir=$(dirname "$last")
echo "minisat $*" >> "$dir/fake.invocations"
printf 'SAT\n1 2 0\n' > "$last"
cat "$dir/fake.solver.stderr" >&2
cat "$dir/fake.solver.stdout"
exit "$(cat "$dir/fake.solver.code")"
"#;

struct Scripts {
    java: PathBuf,
    minisat: PathBuf,
    jar: PathBuf,
}

/// Scripts are created before any test spawns a process, so no child can inherit a handle to a
/// script that is still being written.
fn scripts() -> &'static Scripts {
    static SCRIPTS: OnceLock<Scripts> = OnceLock::new();

    SCRIPTS.get_or_init(|| {
        let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR"))
            .join(format!("fake-tools-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("failed to create the fake tools directory");

        let scripts = Scripts {
            java: dir.join("java"),
            minisat: dir.join("minisat"),
            jar: dir.join("sugar.jar"),
        };

        write_executable(&scripts.java, JAVA);
        write_executable(&scripts.minisat, MINISAT);
        fs::write(&scripts.jar, "").expect("failed to create the fake jar");

        scripts
    })
}

fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).expect("failed to write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("failed to make script executable");
}

pub struct FakeTools {
    scratch: TempDir,
}

impl FakeTools {
    /// Tools that encode, find a model and decode it to the single value `1`.
    pub fn new() -> FakeTools {
        let _ = scripts();

        let tools = FakeTools {
            scratch: tempfile::tempdir().expect("failed to create scratch directory"),
        };

        tools
            .encoder(0, "")
            .solver(10, "SATISFIABLE\n", MINISAT_STATS)
            .decoder(0, "s SATISFIABLE\nv 1\n");

        tools
    }

    pub fn encoder(&self, code: i32, stdout: &str) -> &Self {
        self.write("fake.encoder.code", &code.to_string());
        self.write("fake.encoder.stdout", stdout);
        self
    }

    pub fn solver(&self, code: i32, stdout: &str, stderr: &str) -> &Self {
        self.write("fake.solver.code", &code.to_string());
        self.write("fake.solver.stdout", stdout);
        self.write("fake.solver.stderr", stderr);
        self
    }

    pub fn decoder(&self, code: i32, stdout: &str) -> &Self {
        self.write("fake.decoder.code", &code.to_string());
        self.write("fake.decoder.stdout", stdout);
        self
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    pub fn config_builder(&self) -> ConfigBuilder {
        let scripts = scripts();

        Config::builder()
            .java(&scripts.java)
            .solver(&scripts.minisat)
            .compiler(&scripts.jar)
            .scratch_dir(self.scratch.path())
    }

    pub fn config(&self) -> Config {
        self.config_builder()
            .build()
            .expect("the fake tools form a valid configuration")
    }

    /// The command lines the fake tools were started with, in order.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.scratch.path().join("fake.invocations"))
            .map(|log| log.lines().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// The files in the scratch directory that were not put there by the fake tools setup.
    pub fn run_files(&self) -> Vec<String> {
        let mut files = fs::read_dir(self.scratch.path())
            .expect("failed to list scratch directory")
            .map(|entry| {
                entry
                    .expect("failed to read directory entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .filter(|name| !name.starts_with("fake."))
            .collect::<Vec<_>>();

        files.sort();
        files
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.scratch.path().join(name), contents).expect("failed to configure fake tool");
    }
}
