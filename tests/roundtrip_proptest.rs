//! Property-based tests: parsing and serializing back is lossless, and transforms that
//! change nothing leave the text as it was.

use proptest::prelude::*;
use recast::config::SubstitutionConfig;
use recast::{Format, ImportRename, Substitution, Transform};

/// Statements valid at module level, combined into arbitrary modules
const STATEMENTS: &[&str] = &[
    "import os",
    "import old_pkg.sub as sub",
    "from old_pkg import thing",
    "from setuptools import setup",
    "x = 'value'",
    "__version__ = \"0.1.0\"",
    "setup(name='pkg', packages=['pkg', 'pkg.sub'])",
    "# a comment",
    "",
    "def f(a, b=1):\n    return a + b",
    "class C:\n    '''Doc'''\n    attr = old_pkg",
    "if x:\n    pass\nelse:\n    y = [1,\n         2]",
];

fn python_module() -> impl Strategy<Value = String> {
    (
        prop::option::of("[A-Za-z ]{1,20}"),
        prop::collection::vec(prop::sample::select(STATEMENTS), 0..8),
        any::<bool>(),
    )
        .prop_map(|(title, statements, trailing_newline)| {
            let mut module = String::new();
            if let Some(title) = title {
                let title = title.trim();
                let title = if title.is_empty() { "Title" } else { title };
                module.push_str(&format!(
                    "\"\"\"\n    {}\n    {}\n\"\"\"\n",
                    title,
                    "=".repeat(title.len())
                ));
            }
            module.push_str(&statements.join("\n"));
            if trailing_newline {
                module.push('\n');
            }
            module
        })
}

fn parse_and_output(format: Format, source: &str) -> String {
    format
        .parse(source, SubstitutionConfig::default())
        .unwrap()
        .output()
}

proptest! {
    #[test]
    fn text_formats_round_trip(source in "[ -~\t\r\n]{0,300}") {
        for format in [Format::Plain, Format::Rst, Format::Ini, Format::Yaml] {
            prop_assert_eq!(parse_and_output(format, &source), source.clone());
        }
    }

    #[test]
    fn python_round_trip(source in python_module()) {
        for format in [Format::Python, Format::PythonSetup, Format::PythonInit] {
            prop_assert_eq!(parse_and_output(format, &source), source.clone());
        }
    }

    #[test]
    fn absent_literal_is_a_noop(source in "[ -~\t\n]{0,300}") {
        let transform = Transform::new().with_substitution(Substitution::new("\u{e9}", "x"));
        for format in [Format::Plain, Format::Rst, Format::Ini, Format::Yaml] {
            let mut content = format.parse(&source, SubstitutionConfig::default()).unwrap();
            content.transform(&transform).unwrap();
            prop_assert_eq!(content.output(), source.clone());
        }
    }

    #[test]
    fn empty_transform_is_a_noop(source in python_module()) {
        let mut content = Format::PythonSetup
            .parse(&source, SubstitutionConfig::default())
            .unwrap();
        content.transform(&Transform::new()).unwrap();
        prop_assert_eq!(content.output(), source.clone());

        let identity = Transform::new()
            .with_import_rename(ImportRename::new("old_pkg", "old_pkg"))
            .with_substitution(Substitution::new("pkg", "pkg"));
        content.transform(&identity).unwrap();
        prop_assert_eq!(content.output(), source);
    }
}
