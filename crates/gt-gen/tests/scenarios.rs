//! End-to-end generation over temporary Go packages.

use std::fs;

use camino::Utf8PathBuf;
use gt_core::{Config, ConfigError, FilterConfig};
use gt_gen::{ErrorKind, FilterCriteria, GenerateOptions, Generator, PathResult};

const CALC: &str = "package calc

// Add returns the sum.
func Add(a, b int) int {
	return a + b
}

func sum(xs []int) int {
	total := 0
	for _, x := range xs {
		total += x
	}
	return total
}
";

fn temp_package(files: &[(&str, &str)]) -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp dir");
    for (name, content) in files {
        fs::write(root.join(name), content).expect("Failed to write file");
    }
    (dir, root)
}

fn generator(only: Option<&str>, exported: bool, all: bool) -> Generator {
    let criteria = FilterCriteria::new(only, None, exported, all).expect("Valid criteria");
    Generator::new(GenerateOptions::new(criteria))
}

fn test_names(generator: &Generator, path: Utf8PathBuf) -> Vec<String> {
    generator
        .generate(&[path])
        .iter()
        .flat_map(|outcome| outcome.files().to_vec())
        .flat_map(|file| file.test_names().map(str::to_owned).collect::<Vec<_>>())
        .collect()
}

#[test]
fn exported_only_selects_add() {
    let (_guard, root) = temp_package(&[("calc.go", CALC)]);
    let names = test_names(&generator(None, true, false), root.join("calc.go"));
    assert_eq!(names, vec!["TestAdd"]);
}

#[test]
fn all_functions_skips_existing_test() {
    let (_guard, root) = temp_package(&[
        ("calc.go", CALC),
        (
            "calc_test.go",
            "package calc\n\nimport \"testing\"\n\nfunc TestAdd(t *testing.T) {}\n",
        ),
    ]);
    let generator = generator(None, false, true);
    let outcomes = generator.generate(&[root.join("calc.go")]);

    let file = &outcomes[0].files()[0];
    assert_eq!(file.test_names().collect::<Vec<_>>(), vec!["Testsum"]);
    assert_eq!(file.path, root.join("calc_test.go"));

    let text = file.text().expect("UTF-8 output");
    assert!(text.starts_with(
        "package calc\n\nimport \"testing\"\n\nfunc TestAdd(t *testing.T) {}\n\nfunc Testsum(t *testing.T) {\n"
    ));
    assert!(text.contains("if got := sum(tt.args.xs); got != tt.want {"));
}

#[test]
fn unmatched_pattern_is_not_an_error() {
    let (_guard, root) = temp_package(&[("calc.go", CALC)]);
    let generator = generator(Some("^Parse"), false, false);
    let outcomes = generator.generate(&[root.join("calc.go")]);

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0].result, PathResult::NoEligible));
    assert!(!outcomes[0].is_failure());

    let stats = generator.stats();
    assert_eq!(stats.no_eligible, 1);
    assert_eq!(stats.errors, 0);
}

#[test]
fn malformed_pattern_fails_before_reading() {
    let config = Config {
        paths: vec![Utf8PathBuf::from("/nonexistent/gotests/calc.go")],
        filter: FilterConfig {
            only: Some("Add(".to_owned()),
            ..FilterConfig::default()
        },
        ..Config::default()
    };

    let err = GenerateOptions::from_config(&config).expect_err("Pattern should not compile");
    assert!(matches!(&err, ConfigError::InvalidPattern { option, .. } if option == "--only"));
    assert!(err.to_string().starts_with("invalid --only regex: "));
}

#[test]
fn allow_error_keeps_going() {
    let (_guard, root) = temp_package(&[
        ("broken.go", "package calc\n\nfunc Broken(a int {\n"),
        ("calc.go", CALC),
    ]);
    let generator = generator(None, true, false);
    let outcomes = generator.generate(&[root.join("broken.go"), root.join("calc.go")]);

    assert_eq!(outcomes.len(), 2);
    let PathResult::Failed(err) = &outcomes[0].result else {
        panic!("first path should fail");
    };
    assert_eq!(err.kind(), ErrorKind::Parse);

    let names: Vec<&str> = outcomes[1].files()[0].test_names().collect();
    assert_eq!(names, vec!["TestAdd"]);

    let stats = generator.stats();
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.tests, 1);
}

#[test]
fn output_is_stable_across_runs() {
    let (_guard, root) = temp_package(&[
        ("calc.go", CALC),
        (
            "shapes.go",
            "package calc\n\nimport \"image\"\n\ntype Shape struct {\n\tOrigin image.Point\n\tname   string\n}\n\nfunc (s *Shape) Move(dx, dy int) (image.Point, error) { return s.Origin, nil }\n",
        ),
    ]);

    let first = generator(None, false, true).generate(&[root.clone()]);
    let second = generator(None, false, true).generate(&[root]);

    let contents = |outcomes: &[gt_gen::PathOutcome]| -> Vec<Vec<u8>> {
        outcomes
            .iter()
            .flat_map(|o| o.files().iter().map(|f| f.content.clone()).collect::<Vec<_>>())
            .collect()
    };
    assert_eq!(contents(&first), contents(&second));

    let files = first[0].files();
    assert_eq!(files.len(), 2);
    let shapes = files[1].text().expect("UTF-8 output");
    assert!(shapes.contains("\t\"image\"\n"));
    assert!(shapes.contains("s := &Shape{\n\t\t\tOrigin: tt.fields.Origin,\n\t\t\tname:   tt.fields.name,\n\t\t}\n"));
    assert!(shapes.contains("got, err := s.Move(tt.args.dx, tt.args.dy)"));
}

#[test]
fn receiver_field_types_import_from_declaring_file() {
    let (_guard, root) = temp_package(&[
        (
            "types.go",
            "package calc\n\nimport \"time\"\n\ntype Calc struct {\n\ttimeout time.Duration\n\tbase    int\n}\n",
        ),
        (
            "calc.go",
            "package calc\n\nfunc (c *Calc) Add(a int) int { return c.base + a }\n",
        ),
    ]);
    let outcomes = generator(None, true, false).generate(&[root.join("calc.go")]);

    let text = outcomes[0].files()[0].text().expect("UTF-8 output");
    assert!(text.contains("import (\n\t\"testing\"\n\t\"time\"\n)\n"));
    assert!(text.contains("\t\ttimeout time.Duration\n"));
}

#[test]
fn nested_anonymous_field_keeps_path_alive() {
    let (_guard, root) = temp_package(&[(
        "server.go",
        "package srv\n\ntype Server struct {\n\taddr string\n\topts struct {\n\t\tA int\n\t}\n}\n\nfunc (s *Server) Addr() string { return s.addr }\n\nfunc Plain(a int) int { return a }\n",
    )]);
    let outcomes = generator(None, false, true).generate(&[root.join("server.go")]);

    assert!(!outcomes[0].is_failure());
    let file = &outcomes[0].files()[0];
    assert_eq!(file.test_names().collect::<Vec<_>>(), vec!["TestServer_Addr", "TestPlain"]);

    let text = file.text().expect("UTF-8 output");
    assert!(text.contains("\t\topts struct{ A int }\n"));
}
