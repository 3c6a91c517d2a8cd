//! Tests d'intégration : lecture, exécuteurs, fichiers de référence

mod common;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use common::{distribution_zip, Sheet};
use mojxml::executor::{
    executor_for, Executor, ProcessPoolExecutor, SingleThreadExecutor, ThreadPoolExecutor,
    WorkerCommand, WorkerKind,
};
use mojxml::{iter_content_xmls, parse_raw, Feature, MojxmlError, ParseOptions, Value};

fn run(executor: &dyn Executor, paths: &[PathBuf]) -> Vec<Result<Vec<Feature>, MojxmlError>> {
    executor
        .iter_process(Box::new(iter_content_xmls(paths)))
        .collect()
}

fn count(executor: &dyn Executor, paths: &[PathBuf]) -> usize {
    run(executor, paths)
        .into_iter()
        .map(|r| r.unwrap().len())
        .sum()
}

/// Features indexées par 筆ID, pour comparer des multiensembles
fn by_id(results: Vec<Result<Vec<Feature>, MojxmlError>>) -> HashMap<String, Feature> {
    results
        .into_iter()
        .flat_map(|r| r.unwrap())
        .map(|f| (f.text("筆ID").unwrap().to_string(), f))
        .collect()
}

fn write_sheets(dir: &Path, sheets: &[Sheet]) -> Vec<PathBuf> {
    sheets
        .iter()
        .map(|sheet| {
            let path = dir.join(format!("{}.xml", sheet.map_name));
            std::fs::write(&path, sheet.xml()).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_single_document_features() {
    let xml = Sheet {
        parcels: 12,
        ..Sheet::default()
    }
    .xml();
    let features = parse_raw(xml.as_bytes(), &ParseOptions::default()).unwrap();
    assert_eq!(features.len(), 12);

    for feature in &features {
        assert_eq!(feature.text("市区町村名"), Some("千代田区"));
        assert_eq!(feature.text("測地系判別"), Some("変換"));
        assert_eq!(feature.text("大字名"), Some("本町"));
        assert_eq!(feature.properties["丁目名"], Value::Null);

        let polygons = &feature.geometry.as_ref().unwrap().0;
        assert_eq!(polygons.len(), 1);
        let ring = &polygons[0].exterior().0;
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        // Zone IX autour de Tokyo
        for c in ring {
            assert!((139.70..139.80).contains(&c.x), "lon={}", c.x);
            assert!((35.64..35.72).contains(&c.y), "lat={}", c.y);
            let scaled = c.x * 1e9;
            assert!((scaled - scaled.round()).abs() < 1e-3);
        }
    }
}

#[test]
fn test_executors_agree() {
    let dir = tempfile::tempdir().unwrap();
    let sheets: Vec<Sheet> = ["図A", "図B", "図C", "図D", "図E"]
        .into_iter()
        .map(|map_name| Sheet {
            map_name,
            parcels: 7,
            ..Sheet::default()
        })
        .collect();
    let paths = write_sheets(dir.path(), &sheets);
    let options = ParseOptions::default();

    let single = by_id(run(&SingleThreadExecutor::new(options), &paths));
    let thread = by_id(run(&ThreadPoolExecutor::new(options, 3).unwrap(), &paths));

    assert_eq!(single.len(), 35);
    assert_eq!(single, thread);
}

fn worker_binary() -> WorkerCommand {
    WorkerCommand::new(env!("CARGO_BIN_EXE_mojxml-worker"), Vec::<String>::new())
}

#[test]
fn test_process_pool_matches_single() {
    let dir = tempfile::tempdir().unwrap();
    let sheets: Vec<Sheet> = ["図A", "図B", "図C", "図D"]
        .into_iter()
        .map(|map_name| Sheet {
            map_name,
            parcels: 5,
            ..Sheet::default()
        })
        .collect();
    let paths = write_sheets(dir.path(), &sheets);
    let options = ParseOptions::default();

    let process = ProcessPoolExecutor::with_worker(options, 3, worker_binary());
    let results = run(&process, &paths);
    assert_eq!(results.len(), 4);

    let single = by_id(run(&SingleThreadExecutor::new(options), &paths));
    assert_eq!(single.len(), 20);
    assert_eq!(by_id(results), single);
}

#[test]
fn test_process_pool_forwards_options() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sheets(
        dir.path(),
        &[
            Sheet {
                map_name: "区域外",
                parcels: 3,
                chikugai: 2,
                ..Sheet::default()
            },
            Sheet {
                map_name: "任意",
                crs: "任意座標系",
                parcels: 4,
                ..Sheet::default()
            },
        ],
    );

    let default = ProcessPoolExecutor::with_worker(ParseOptions::default(), 2, worker_binary());
    assert_eq!(count(&default, &paths), 3);

    let options = ParseOptions {
        include_arbitrary_crs: true,
        include_chikugai: true,
    };
    let process = ProcessPoolExecutor::with_worker(options, 2, worker_binary());
    let single = SingleThreadExecutor::new(options);
    assert_eq!(count(&process, &paths), 9);
    assert_eq!(by_id(run(&process, &paths)), by_id(run(&single, &paths)));
}

#[test]
fn test_process_pool_carries_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_sheets(dir.path(), &[Sheet::default()]);
    let broken = dir.path().join("broken.xml");
    std::fs::write(&broken, "<地図>").unwrap();
    paths.push(broken);

    let process = ProcessPoolExecutor::with_worker(ParseOptions::default(), 2, worker_binary());
    let results = run(&process, &paths);
    assert_eq!(results.len(), 2);
    assert!(results.iter().any(|r| matches!(r, Ok(f) if f.len() == 4)));
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(MojxmlError::Parse(_)))));
}

#[test]
fn test_default_process_pool_finds_worker() {
    // Binaire de test sous target/<profil>/deps, worker sous target/<profil>
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sheets(dir.path(), &[Sheet::default()]);

    let executor = executor_for(WorkerKind::Multiprocess, ParseOptions::default(), Some(1)).unwrap();
    let results = run(executor.as_ref(), &paths);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].as_ref().unwrap().len(), 4);
}

#[test]
fn test_nested_distribution_archive() {
    let dir = tempfile::tempdir().unwrap();
    let documents: Vec<(&str, String)> = vec![
        (
            "13101-0100-1",
            Sheet {
                map_name: "一",
                parcels: 3,
                ..Sheet::default()
            }
            .xml(),
        ),
        (
            "13101-0100-2",
            Sheet {
                map_name: "二",
                parcels: 5,
                ..Sheet::default()
            }
            .xml(),
        ),
        (
            "13101-0100-3",
            Sheet {
                map_name: "三",
                crs: "任意座標系",
                parcels: 9,
                ..Sheet::default()
            }
            .xml(),
        ),
    ];
    let path = dir.path().join("13101-0100.zip");
    std::fs::write(&path, distribution_zip(&documents)).unwrap();
    let paths = vec![path];

    let executor = executor_for(WorkerKind::Thread, ParseOptions::default(), Some(2)).unwrap();
    let results = run(executor.as_ref(), &paths);
    assert_eq!(results.len(), 3);
    assert_eq!(count(executor.as_ref(), &paths), 8);

    let options = ParseOptions {
        include_arbitrary_crs: true,
        ..ParseOptions::default()
    };
    let executor = executor_for(WorkerKind::Single, options, None).unwrap();
    assert_eq!(count(executor.as_ref(), &paths), 17);
}

#[test]
fn test_chikugai_switch() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sheets(
        dir.path(),
        &[Sheet {
            parcels: 6,
            chikugai: 2,
            ..Sheet::default()
        }],
    );

    let default = SingleThreadExecutor::new(ParseOptions::default());
    assert_eq!(count(&default, &paths), 6);

    let with_chikugai = SingleThreadExecutor::new(ParseOptions {
        include_chikugai: true,
        ..ParseOptions::default()
    });
    assert_eq!(count(&with_chikugai, &paths), 8);
}

#[test]
fn test_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_sheets(dir.path(), &[Sheet::default()]);
    let broken = dir.path().join("broken.xml");
    std::fs::write(&broken, "<地図>").unwrap();
    paths.insert(0, broken);
    paths.push(dir.path().join("notes.txt"));

    let executor = ThreadPoolExecutor::new(ParseOptions::default(), 2).unwrap();
    let results = run(&executor, &paths);
    assert_eq!(results.len(), 3);

    let ok: usize = results.iter().filter_map(|r| r.as_ref().ok()).map(Vec::len).sum();
    assert_eq!(ok, 4);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(MojxmlError::Parse(_)))));
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(MojxmlError::UnsupportedInputType(_)))));
}

// Fichiers de référence du 法務省, présents seulement en local

fn testdata(name: &str) -> Option<PathBuf> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../testdata")
        .join(name);
    if path.exists() {
        Some(path)
    } else {
        eprintln!("{} not found, skipping test", name);
        None
    }
}

#[test]
fn test_reference_file_counts() {
    let executor = ThreadPoolExecutor::new(ParseOptions::default(), 4).unwrap();
    for (name, expected) in [
        ("15222-1107-1553.xml", 1051),
        ("12103-0400.zip", 3371),
        ("12103-0400-76.zip", 1),
    ] {
        let Some(path) = testdata(name) else { continue };
        assert_eq!(count(&executor, &[path]), expected, "{}", name);
    }
}

#[test]
fn test_reference_file_switches() {
    let Some(path) = testdata("15222-1107-1553.xml") else {
        return;
    };
    let paths = [path];

    let arbitrary = SingleThreadExecutor::new(ParseOptions {
        include_arbitrary_crs: true,
        ..ParseOptions::default()
    });
    assert_eq!(count(&arbitrary, &paths), 1051);

    let chikugai = SingleThreadExecutor::new(ParseOptions {
        include_chikugai: true,
        ..ParseOptions::default()
    });
    assert_eq!(count(&chikugai, &paths), 1051);
}

#[test]
fn test_reference_archive_with_arbitrary() {
    let Some(path) = testdata("12103-0400.zip") else {
        return;
    };
    let paths = [path];

    let arbitrary = ParseOptions {
        include_arbitrary_crs: true,
        ..ParseOptions::default()
    };
    let executor = ThreadPoolExecutor::new(arbitrary, 4).unwrap();
    assert_eq!(count(&executor, &paths), 71073);

    let all = ParseOptions {
        include_arbitrary_crs: true,
        include_chikugai: true,
    };
    let executor = ThreadPoolExecutor::new(all, 4).unwrap();
    assert_eq!(count(&executor, &paths), 71103);
}

#[test]
fn test_reference_files_parse_cleanly() {
    let pattern = Path::new(env!("CARGO_MANIFEST_DIR")).join("../testdata/*.xml");
    let files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .collect();
    if files.is_empty() {
        eprintln!("No XML in testdata, skipping test");
        return;
    }

    let options = ParseOptions {
        include_arbitrary_crs: true,
        include_chikugai: true,
    };
    for file in files {
        let content = std::fs::read(&file).unwrap();
        let features = parse_raw(&content, &options)
            .unwrap_or_else(|e| panic!("{}: {}", file.display(), e));
        for feature in &features {
            assert!(feature.text("筆ID").is_some(), "{}", file.display());
        }
    }
}
