//! Integration tests for view configuration loading, merging and validation

use std::io::Write;
use tabview::prelude::*;

const INVOICES_YAML: &str = r#"
views:
  - name: invoices
    id_field: invoice_id
    columns:
      - label: Customer
        field: customer
      - label: Issued
        field: issued_at
        kind: date
      - label: Amount
        field: amount
        kind: number
    search_fields: [customer]
    date_field: issued_at
    sort_keys:
      - label: Amount
        field: amount
        kind: number
        direction: descending
    default_sort: Amount
    export:
      filename: invoices
      title: Invoices
"#;

#[test]
fn test_yaml_defaults_are_applied() {
    let config = ViewsConfig::from_yaml_str(INVOICES_YAML).unwrap();
    config.validate().unwrap();

    let view = config.get("invoices").unwrap();
    assert_eq!(view.page_size, 10);
    assert_eq!(view.max_pages_to_show, 5);
    assert_eq!(view.search_debounce_ms, 250);
    assert_eq!(view.facet_field, None);
    assert_eq!(view.export.row_number_header, None);
    assert_eq!(view.columns[0].kind, FieldKind::Text);
    assert_eq!(view.field_kind("issued_at"), FieldKind::Date);
    assert_eq!(
        view.sort_key("Amount").map(|k| k.direction),
        Some(SortDirection::Descending)
    );
}

#[test]
fn test_yaml_view_drives_table() {
    let config = ViewsConfig::from_yaml_str(INVOICES_YAML).unwrap();
    let view_config = config.get("invoices").unwrap().clone();
    let records = vec![
        Record::new()
            .with("invoice_id", 1_i64)
            .with("customer", "Acme")
            .with("issued_at", "2025-03-01")
            .with("amount", 120.5),
        Record::new()
            .with("invoice_id", 2_i64)
            .with("customer", "Globex")
            .with("issued_at", "2025-03-02")
            .with("amount", 980_i64),
    ];

    let mut view = TableView::new(view_config);
    let page = view.page(&records);
    assert_eq!(page.items[0].id("invoice_id"), Some("2".to_string()));

    let payload = view.export(&records, ExportFormat::Csv).unwrap();
    assert_eq!(payload.filename, "invoices.csv");
    assert!(payload.body.starts_with("Customer,Issued,Amount\n"));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(INVOICES_YAML.as_bytes()).unwrap();

    let config = ViewsConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.views.len(), 1);
}

#[test]
fn test_single_view_file() {
    let yaml = serde_yaml::to_string(&ViewConfig::history()).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let view = ViewConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(view, ViewConfig::history());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ViewsConfig::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::IoError { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn test_parse_error_names_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"views:\n  - name: [unclosed\n").unwrap();

    let err = ViewsConfig::from_yaml_file(file.path()).unwrap_err();
    match err {
        ConfigError::ParseError { file: Some(name), .. } => {
            assert_eq!(name, file.path().display().to_string());
        }
        other => panic!("expected parse error with file, got {other:?}"),
    }
}

#[test]
fn test_merge_overrides_by_name() {
    let mut narrow = ViewConfig::interns();
    narrow.page_size = 25;
    let extra = ViewsConfig::from_yaml_str(INVOICES_YAML).unwrap();

    let merged = ViewsConfig::merge(vec![
        ViewsConfig::default_config(),
        ViewsConfig { views: vec![narrow] },
        extra,
    ]);

    let names: Vec<&str> = merged.views.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["attendance", "interns", "history", "invoices"]);
    assert_eq!(merged.get("interns").unwrap().page_size, 25);
    merged.validate().unwrap();
}

#[test]
fn test_merge_empty() {
    assert!(ViewsConfig::merge(vec![]).views.is_empty());
}

mod validation {
    use super::*;

    #[test]
    fn test_duplicate_column_label() {
        let mut view = ViewConfig::attendance();
        view.columns
            .push(ColumnConfig::new("Name", "intern_id", FieldKind::Text));
        assert!(matches!(
            view.validate(),
            Err(ConfigError::InvalidValue { value, .. }) if value == "Name"
        ));
    }

    #[test]
    fn test_unknown_search_field() {
        let mut view = ViewConfig::attendance();
        view.search_fields.push("nickname".to_string());
        match view.validate() {
            Err(ConfigError::UnknownField { field, context }) => {
                assert_eq!(field, "nickname");
                assert_eq!(context, "attendance.search_fields");
            }
            other => panic!("expected unknown field, got {other:?}"),
        }
    }

    #[test]
    fn test_search_field_declared_only_in_schema() {
        let mut view = ViewConfig::attendance();
        view.search_fields.push("intern_id".to_string());
        view.validate().unwrap();
    }

    #[test]
    fn test_unknown_default_sort() {
        let mut view = ViewConfig::history();
        view.default_sort = Some("Shoe Size".to_string());
        assert!(matches!(
            view.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "history.default_sort"
        ));
    }

    #[test]
    fn test_empty_columns() {
        let mut view = ViewConfig::interns();
        view.columns.clear();
        view.search_fields.clear();
        view.sort_keys.clear();
        view.default_sort = None;
        assert!(view.validate().is_err());
    }

    #[test]
    fn test_duplicate_view_names() {
        let config = ViewsConfig {
            views: vec![ViewConfig::history(), ViewConfig::history()],
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { value, .. }) if value == "history"
        ));
    }

    #[test]
    fn test_config_error_wraps_into_tabview_error() {
        let err: TabviewError = ViewConfig::from_yaml_str("columns: 7").unwrap_err().into();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(!err.is_recoverable());
    }
}
