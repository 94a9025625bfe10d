//! Integration tests for the runtime facade.
//!
//! Every scenario runs against the in-memory tree and against the same
//! assets on disk, so both profiles are held to identical behaviour.

use essence_vfs::{Extended, FuncMap, VFile, Vfs, Whence, unix_time};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::json;
use std::fs;
use std::io::Read;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const HELLO: &str = "hello essence\n";
const TMPL: &str = "subject: {{Message}} - {{> subtmpl.tmpl}}\n";
const SUBTMPL: &str = "this is sub template: {{InnerMessage}}\n";
const FUNCTIONS: &str = "html: {{safe Data}}\n";

fn embedded() -> Extended {
    let t = unix_time(1_700_000_000, 0);
    Extended::embedded(Vfs::from_children(
        t,
        [
            VFile::file("functions.tmpl", t, FUNCTIONS.as_bytes()),
            VFile::file("hello_essence.txt", t, HELLO.as_bytes()),
            VFile::dir("subdir", t).with_children([VFile::file("subtmpl.tmpl", t, SUBTMPL.as_bytes())]),
            VFile::file("tmpl.tmpl", t, TMPL.as_bytes()),
        ],
    ))
}

fn on_disk() -> (TempDir, Extended) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("functions.tmpl"), FUNCTIONS).unwrap();
    fs::write(temp.path().join("hello_essence.txt"), HELLO).unwrap();
    fs::create_dir(temp.path().join("subdir")).unwrap();
    fs::write(temp.path().join("subdir/subtmpl.tmpl"), SUBTMPL).unwrap();
    fs::write(temp.path().join("tmpl.tmpl"), TMPL).unwrap();
    let fs = Extended::passthrough(temp.path());
    (temp, fs)
}

fn both(check: impl Fn(&Extended)) {
    check(&embedded());
    let (_temp, disk) = on_disk();
    check(&disk);
}

fn safe_helper() -> FuncMap {
    let mut funcs = FuncMap::new();
    funcs.insert(
        "safe".to_string(),
        Box::new(
            |h: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output| -> HelperResult {
                let raw = h.param(0).and_then(|p| p.value().as_str()).unwrap_or_default();
                out.write(raw)?;
                Ok(())
            },
        ),
    );
    funcs
}

#[test]
fn test_read_hello_essence() {
    both(|fs| {
        let mut file = fs.open("/hello_essence.txt").unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        file.close();
        assert_eq!(out, HELLO);
    });
}

#[test]
fn test_reopen_reads_from_start() {
    both(|fs| {
        let mut first = fs.open("/hello_essence.txt").unwrap();
        let mut scratch = [0u8; 4];
        first.read_exact(&mut scratch).unwrap();

        let mut second = fs.open("/hello_essence.txt").unwrap();
        let mut out = String::new();
        second.read_to_string(&mut out).unwrap();
        assert_eq!(out, HELLO);
    });
}

#[test]
fn test_seek_start_then_read() {
    both(|fs| {
        let mut file = fs.open("/hello_essence.txt").unwrap();
        assert_eq!(file.seek_to(6, Whence::Start).unwrap(), 6);
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        assert_eq!(out, "essence\n");
    });
}

#[test]
fn test_seek_bounds_match_between_profiles() {
    both(|fs| {
        let mut file = fs.open("/hello_essence.txt").unwrap();
        let len = i64::try_from(HELLO.len()).unwrap();

        file.seek_to(3, Whence::Start).unwrap();
        assert!(file.seek_to(-1, Whence::Start).unwrap_err().is_out_of_range());
        assert!(file.seek_to(len, Whence::Start).unwrap_err().is_out_of_range());
        assert!(file.seek_to(len, Whence::Current).unwrap_err().is_out_of_range());
        assert!(file.seek_to(-1, Whence::End).unwrap_err().is_out_of_range());
        assert_eq!(file.seek_to(len - 1, Whence::Start).unwrap(), 13);
        assert_eq!(file.seek_to(0, Whence::End).unwrap(), 13);
        assert_eq!(file.seek_to(13, Whence::End).unwrap(), 0);

        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        assert_eq!(out, HELLO);
    });
}

#[test]
fn test_seek_on_directory_matches_between_profiles() {
    both(|fs| {
        let mut dir = fs.open("/subdir").unwrap();
        assert_eq!(dir.seek_to(0, Whence::Start).unwrap(), 0);
        assert!(dir.seek_to(1, Whence::Start).unwrap_err().is_out_of_range());
    });
}

#[test]
fn test_string() {
    both(|fs| assert_eq!(fs.string("/hello_essence.txt").unwrap(), HELLO));
}

#[test]
fn test_parse_files_with_partial() {
    both(|fs| {
        let set = fs.parse_files(["/tmpl.tmpl", "/subdir/subtmpl.tmpl"]).unwrap();
        let out = set
            .execute_template("tmpl.tmpl", &json!({"Message": "a", "InnerMessage": "b"}))
            .unwrap();
        assert_eq!(out, "subject: a - this is sub template: b\n\n");
    });
}

#[test]
fn test_parse_files_with_func_map() {
    both(|fs| {
        let set = fs
            .parse_files_with_func_map(safe_helper(), ["/functions.tmpl"])
            .unwrap();
        let out = set
            .execute_template("functions.tmpl", &json!({"Data": "<p>paragraph</p>"}))
            .unwrap();
        assert_eq!(out, "html: <p>paragraph</p>\n");
    });
}

#[test]
fn test_parse_glob() {
    both(|fs| {
        let set = fs.parse_glob("/subdir/*.tmpl").unwrap();
        assert_eq!(set.names(), ["subtmpl.tmpl"]);
        let out = set
            .execute_template("subtmpl.tmpl", &json!({"InnerMessage": "b"}))
            .unwrap();
        assert_eq!(out, "this is sub template: b\n");
    });
}

#[test]
fn test_parse_glob_root_level_only() {
    both(|fs| {
        let set = fs.parse_glob("/*.tmpl").unwrap();
        assert_eq!(set.names(), ["functions.tmpl", "tmpl.tmpl"]);
    });
}

#[test]
fn test_walk_order_matches_between_profiles() {
    let collect = |fs: &Extended| {
        let mut paths = Vec::new();
        fs.walk(|path, _| paths.push(path.to_string())).unwrap();
        paths
    };

    let (_temp, disk) = on_disk();
    assert_eq!(collect(&embedded()), collect(&disk));
}

#[test]
fn test_not_found_and_relative_paths() {
    both(|fs| {
        assert!(fs.open("/missing.txt").unwrap_err().is_not_found());
        assert!(fs.open("hello_essence.txt").unwrap_err().is_invalid_path());
        assert!(fs.string("/subdir/missing.tmpl").unwrap_err().is_not_found());
    });
}

#[test]
fn test_concurrent_readers_are_isolated() {
    let fs = Arc::new(embedded());

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let fs = Arc::clone(&fs);
            thread::spawn(move || {
                for _ in 0..200 {
                    let mut file = fs.open("/hello_essence.txt").unwrap();
                    if i % 2 == 0 {
                        file.seek_to(6, Whence::Start).unwrap();
                        let mut out = String::new();
                        file.read_to_string(&mut out).unwrap();
                        assert_eq!(out, "essence\n");
                    } else {
                        let mut out = String::new();
                        file.read_to_string(&mut out).unwrap();
                        assert_eq!(out, HELLO);
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn test_bundle_feeds_facade() {
    let t = unix_time(1_700_000_000, 0);
    let vfs = Vfs::from_children(t, [VFile::file("hello_essence.txt", t, HELLO.as_bytes())]);
    let bytes = vfs.to_bundle().unwrap();

    let fs = Extended::embedded(Vfs::from_bundle(&bytes).unwrap());
    assert_eq!(fs.string("/hello_essence.txt").unwrap(), HELLO);
}
