//! End-to-end conformance suite for the flattening pipeline
//!
//! Drives the full pipeline through the in-memory graph adapter, with
//! on-disk fixtures wherever the static source scans are involved.

use std::fs;

use gasket::{
    BuildMode, BundleError, Config, ContextToken, ExportInfo, ExportsInfo, MemoryGraph, flatten,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn config() -> Config {
    Config {
        namespace_root: "MYADDON".to_owned(),
        subsystem: "GAS".to_owned(),
        ..Config::default()
    }
}

/// Index of `needle` in `haystack`, with a readable failure
fn offset_of(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("expected artifact to contain `{needle}`"))
}

#[test]
fn single_entry_graph_emits_one_artifact_with_ordered_assignments() {
    let mut graph = MemoryGraph::new();
    let entry = graph.add_module(
        Some("src/entry.ts"),
        Some("function doGet() {}\nfunction onInstall() {}\n"),
    );
    graph.set_exports(
        entry,
        ExportsInfo::named(vec![
            ExportInfo::local("doGet"),
            ExportInfo::local("onInstall"),
        ]),
    );
    let chunk = graph.add_chunk(vec![entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    let artifact = flatten(&graph, &config()).unwrap();
    assert_eq!(artifact.file_name, "main.gs");

    for name in ["doGet", "onInstall"] {
        let definition = offset_of(&artifact.contents, &format!("function {name}"));
        let assignment = offset_of(
            &artifact.contents,
            &format!("globalThis.MYADDON.GAS.{name} = {name};"),
        );
        assert!(
            definition < assignment,
            "assignment for `{name}` must follow its definition"
        );
    }
}

#[test]
fn rerunning_an_unchanged_snapshot_is_byte_identical() {
    let mut graph = MemoryGraph::new();
    let entry = graph.add_module(Some("src/entry.ts"), Some("function doGet() {}\n"));
    graph.set_exports(entry, ExportsInfo::named(vec![ExportInfo::local("doGet")]));
    let chunk = graph.add_chunk(vec![entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    let first = flatten(&graph, &config()).unwrap();
    let second = flatten(&graph, &config()).unwrap();
    assert_eq!(first.contents, second.contents);
    assert_eq!(first.file_name, second.file_name);
}

#[test]
fn default_export_binds_fallback_name_and_override() {
    let mut graph = MemoryGraph::new();
    let entry = graph.add_module(
        Some("src/entry.ts"),
        Some("var defaultExport = function () {};\n"),
    );
    graph.set_exports(entry, ExportsInfo::named(vec![ExportInfo::local("default")]));
    let chunk = graph.add_chunk(vec![entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    let fallback = flatten(&graph, &config()).unwrap();
    assert!(
        fallback
            .contents
            .contains("globalThis.MYADDON.GAS.defaultExport = defaultExport;")
    );

    let overridden = flatten(
        &graph,
        &Config {
            default_export_name: Some("main".to_owned()),
            ..config()
        },
    )
    .unwrap();
    assert!(
        overridden
            .contents
            .contains("globalThis.MYADDON.GAS.main = defaultExport;")
    );
}

#[test]
fn reachable_wildcard_reexport_fails_with_no_artifact() {
    let dir = TempDir::new().unwrap();
    let entry_path = dir.path().join("entry.ts");
    let util_path = dir.path().join("util.ts");
    fs::write(&entry_path, "export function doGet() {}\n").unwrap();
    fs::write(&util_path, "export * from \"./helpers\";\n").unwrap();

    let mut graph = MemoryGraph::new();
    let entry = graph.add_module(Some(entry_path), Some("function doGet() {}\n"));
    let util = graph.add_module(Some(util_path), Some(""));
    graph.set_exports(entry, ExportsInfo::named(vec![ExportInfo::local("doGet")]));
    let chunk = graph.add_chunk(vec![entry, util], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    let out_dir = TempDir::new().unwrap();
    match flatten(&graph, &config()) {
        Err(BundleError::UnsupportedWildcardReexport { .. }) => {}
        other => panic!("expected wildcard re-export error, got {other:?}"),
    }
    assert_eq!(
        fs::read_dir(out_dir.path()).unwrap().count(),
        0,
        "no artifact may be written on failure"
    );
}

#[test]
fn entry_aliased_reexport_fails_and_wrapper_workaround_succeeds() {
    let dir = TempDir::new().unwrap();
    let aliased_path = dir.path().join("entry.ts");
    fs::write(
        &aliased_path,
        "export { onOpen as handleOpen } from \"./triggers\";\n",
    )
    .unwrap();

    let mut graph = MemoryGraph::new();
    let entry = graph.add_module(Some(&aliased_path), Some(""));
    graph.set_exports(
        entry,
        ExportsInfo::named(vec![ExportInfo::local("handleOpen")]),
    );
    let chunk = graph.add_chunk(vec![entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    match flatten(&graph, &config()) {
        Err(BundleError::UnsupportedAliasedReexport {
            original, alias, ..
        }) => {
            assert_eq!(original, "onOpen");
            assert_eq!(alias, "handleOpen");
        }
        other => panic!("expected aliased re-export error, got {other:?}"),
    }

    // Workaround: a local wrapper that imports and calls the target.
    let wrapper_path = dir.path().join("wrapper_entry.ts");
    fs::write(
        &wrapper_path,
        "import { onOpen } from \"./triggers\";\nexport function handleOpen(e) { return \
         onOpen(e); }\n",
    )
    .unwrap();

    let mut graph = MemoryGraph::new();
    let triggers = graph.add_module(
        Some(dir.path().join("triggers.ts")),
        Some("function onOpen(e) {}\n"),
    );
    let entry = graph.add_module(
        Some(&wrapper_path),
        Some("function handleOpen(e) { return onOpen(e); }\n"),
    );
    graph.set_exports(
        entry,
        ExportsInfo::named(vec![ExportInfo::local("handleOpen")]),
    );
    let chunk = graph.add_chunk(vec![triggers, entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    let artifact = flatten(&graph, &config()).unwrap();
    let definition = offset_of(&artifact.contents, "function handleOpen");
    let assignment = offset_of(
        &artifact.contents,
        "globalThis.MYADDON.GAS.handleOpen = handleOpen;",
    );
    assert!(definition < assignment);
}

#[test]
fn entry_with_zero_exports_fails() {
    let mut graph = MemoryGraph::new();
    let entry = graph.add_module(Some("src/entry.ts"), Some("var x = 1;\n"));
    let chunk = graph.add_chunk(vec![entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    assert!(matches!(
        flatten(&graph, &config()),
        Err(BundleError::NoExportedSymbols { .. })
    ));
}

#[test]
fn anchored_reexport_emits_both_definitions_and_assignments() {
    // entry.ts defines foo and re-exports onOpen from triggers.ts, which is
    // side-effect-imported so the host graph retained its body.
    let mut graph = MemoryGraph::new();
    let triggers = graph.add_module(
        Some("src/triggers.ts"),
        Some("function onOpen(e) {}\nregisterTrigger(onOpen);\n"),
    );
    let entry = graph.add_module(Some("src/entry.ts"), Some("function foo() {}\n"));
    graph.set_exports(
        entry,
        ExportsInfo::named(vec![
            ExportInfo::local("foo"),
            ExportInfo::reexport("onOpen", triggers, None),
        ]),
    );
    graph.set_exports(
        triggers,
        ExportsInfo::named(vec![ExportInfo::local("onOpen")]),
    );
    let chunk = graph.add_chunk(vec![triggers, entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    let artifact = flatten(&graph, &config()).unwrap();
    for name in ["foo", "onOpen"] {
        let definition = offset_of(&artifact.contents, &format!("function {name}"));
        let assignment = offset_of(
            &artifact.contents,
            &format!("globalThis.MYADDON.GAS.{name} = {name};"),
        );
        assert!(definition < assignment);
    }
}

#[test]
fn unanchored_elided_reexport_fails_rather_than_dangling() {
    // triggers.ts is only re-exported, never imported for side effects; the
    // host elided its body, so `onOpen` has no runtime definition.
    let mut graph = MemoryGraph::new();
    let triggers = graph.add_module(Some("src/triggers.ts"), None);
    let entry = graph.add_module(Some("src/entry.ts"), Some("function foo() {}\n"));
    graph.set_exports(
        entry,
        ExportsInfo::named(vec![
            ExportInfo::local("foo"),
            ExportInfo::reexport("onOpen", triggers, None),
        ]),
    );
    graph.set_exports(
        triggers,
        ExportsInfo::named(vec![ExportInfo::local("onOpen")]),
    );
    let chunk = graph.add_chunk(vec![entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    match flatten(&graph, &config()) {
        Err(BundleError::MissingRuntimeDefinition { local_name }) => {
            assert_eq!(local_name, "onOpen");
        }
        other => panic!("expected missing-definition failure, got {other:?}"),
    }
}

#[test]
fn loader_runtime_substrings_never_survive_into_the_artifact() {
    let source = "var util = __webpack_require__(3);\nObject.defineProperty(__webpack_exports__, \
                  \"__esModule\", { value: true });\nexport { doGet };\nfunction doGet() {}\n";

    let mut graph = MemoryGraph::new();
    let entry = graph.add_module(Some("src/entry.ts"), Some(source));
    graph.set_exports(entry, ExportsInfo::named(vec![ExportInfo::local("doGet")]));
    let chunk = graph.add_chunk(vec![entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Absent);

    let artifact = flatten(&graph, &config()).unwrap();
    assert!(!artifact.contents.contains("__webpack_require__"));
    assert!(!artifact.contents.contains("__webpack_exports__"));
    assert!(!artifact.contents.contains("__esModule"));
    assert!(!artifact.contents.contains("export {"));
    // Line alignment: the four source lines are still four lines.
    assert!(artifact.contents.contains("function doGet() {}"));
}

#[test]
fn context_token_selects_the_generated_variant() {
    let mut graph = MemoryGraph::new();
    let entry = graph.add_module(Some("src/entry.ts"), Some("function doGet() { return 1; }\n"));
    graph.set_source_for(
        entry,
        ContextToken::Single("web".to_owned()),
        "function doGet() { return 2; }\n",
    );
    graph.set_exports(entry, ExportsInfo::named(vec![ExportInfo::local("doGet")]));
    let chunk = graph.add_chunk(vec![entry], vec![entry]);
    graph.add_entrypoint("main", vec![chunk], ContextToken::Single("web".to_owned()));

    let artifact = flatten(&graph, &config()).unwrap();
    assert!(artifact.contents.contains("return 2;"));
    assert!(!artifact.contents.contains("return 1;"));
}

#[test]
fn web_app_mode_emits_html_wrapper() {
    let mut graph = MemoryGraph::new();
    let entry = graph.add_module(Some("src/entry.ts"), Some("function doGet() {}\n"));
    graph.set_exports(entry, ExportsInfo::named(vec![ExportInfo::local("doGet")]));
    let chunk = graph.add_chunk(vec![entry], vec![entry]);
    graph.add_entrypoint("ui", vec![chunk], ContextToken::Absent);

    let artifact = flatten(
        &graph,
        &Config {
            build_mode: BuildMode::WebApp,
            ..config()
        },
    )
    .unwrap();
    assert_eq!(artifact.file_name, "ui.html");
    assert!(artifact.contents.starts_with("<!DOCTYPE html>"));
    assert!(artifact.contents.contains("<script>"));
    assert!(
        artifact
            .contents
            .contains("globalThis.MYADDON.GAS.doGet = doGet;")
    );
}
