mod helpers;

use bplus_index::{
    cli::{Command, execute},
    config::{Backend, IndexConfig},
    storage::RecordIndex,
};
use helpers::test_debugger;

fn session(backend: Backend, lines: &[&str]) -> (Box<dyn RecordIndex<i64, String>>, String) {
    let config = IndexConfig {
        backend,
        page_size: 2,
        order: 3,
        ..IndexConfig::default()
    };
    let mut index = config.build_index(test_debugger()).unwrap();

    let mut out = Vec::new();
    for line in lines {
        match Command::parse(line) {
            Ok(command) => {
                if execute(index.as_mut(), command, &mut out).unwrap() {
                    break;
                }
            }
            Err(e) => out.extend_from_slice(format!("{e}\n").as_bytes()),
        }
    }

    (index, String::from_utf8(out).unwrap())
}

#[test]
fn scenario_through_the_shell_on_both_backends() {
    let script = [
        "+ 10 A", "+ 20 B", "+ 5 C", "+ 6 D", "+ 30 E", "+ 25 F", "- 20", "r 5 30",
    ];

    for backend in [Backend::Tree, Backend::Pages] {
        let (index, out) = session(backend, &script);

        assert_eq!(index.len(), 5, "{backend}");
        assert!(
            out.ends_with("removed key 20\n5: C\n6: D\n10: A\n25: F\n30: E\n"),
            "{backend}: {out}"
        );
    }
}

#[test]
fn bad_input_does_not_stop_the_session() {
    let (index, out) = session(Backend::Tree, &["+ x y", "+ 1 one", "? 1"]);

    assert_eq!(index.search(&1), vec!["one".to_string()]);
    assert_eq!(
        out,
        "invalid input '+ x y'. Use: + <key> <value>\ninserted (1, one)\nfound: one\n"
    );
}

#[test]
fn removing_a_duplicated_key_clears_it_on_both_backends() {
    let script = ["+ 5 a", "+ 5 b", "+ 6 c", "- 5", "? 5", "? 6"];

    for backend in [Backend::Tree, Backend::Pages] {
        let (index, out) = session(backend, &script);

        assert_eq!(
            out,
            "inserted (5, a)\ninserted (5, b)\ninserted (6, c)\n\
             removed key 5\nno record with key 5\nfound: c\n",
            "{backend}"
        );
        assert_eq!(index.len(), 1, "{backend}");
    }
}
