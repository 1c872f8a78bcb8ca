use super::*;

const CONFIG: &str = r#"
name: clinic
database:
  path: clinica.db
tables:
  - name: receta
    columns:
      - { name: Codigo, type: INTEGER, primary_key: true }
      - name: Codigo_Consulta
        type: INTEGER
        references: { table: consultas, column: Codigo }
  - name: consultas
    columns:
      - { name: Codigo, type: INTEGER, primary_key: true }
      - name: Codigo_Paciente
        type: INTEGER
        references: { table: pacientes, column: Codigo }
  - name: pacientes
    columns:
      - { name: Codigo, type: INTEGER, primary_key: true }
  - name: doctor
    columns:
      - { name: Codigo, type: INTEGER, primary_key: true }
"#;

fn names(tables: &[DeclaredTable]) -> Vec<String> {
    tables.iter().map(|t| t.spec.name.to_string()).collect()
}

#[test]
fn test_parse_list() {
    assert_eq!(parse_list(" a, b ,,c "), vec!["a", "b", "c"]);
    assert!(parse_list(" , ").is_empty());
}

#[test]
fn test_select_all_in_dependency_order() {
    let config = Config::parse(CONFIG).unwrap();
    let order = names(&select_tables(&config, None).unwrap());
    assert_eq!(order, vec!["pacientes", "consultas", "receta", "doctor"]);
}

#[test]
fn test_select_with_parents_and_children() {
    let config = Config::parse(CONFIG).unwrap();

    let parents = names(&select_tables(&config, Some("+receta")).unwrap());
    assert_eq!(parents, vec!["pacientes", "consultas", "receta"]);

    let children = names(&select_tables(&config, Some("PACIENTES+")).unwrap());
    assert_eq!(children, vec!["pacientes", "consultas", "receta"]);

    let plain = names(&select_tables(&config, Some("doctor, consultas")).unwrap());
    assert_eq!(plain, vec!["consultas", "doctor"]);
}

#[test]
fn test_select_unknown_table() {
    let config = Config::parse(CONFIG).unwrap();
    let err = select_tables(&config, Some("facturas")).unwrap_err();
    assert!(err.to_string().contains("facturas"));
}

#[test]
fn test_database_override() {
    let project = Project {
        config: Config::parse(CONFIG).unwrap(),
        root: PathBuf::from("/srv/clinica"),
    };
    let mut global = GlobalArgs {
        verbose: false,
        config: "schemaforge.yml".to_string(),
        database: None,
    };
    assert_eq!(
        project.database_path(&global),
        PathBuf::from("/srv/clinica/clinica.db")
    );

    global.database = Some("/tmp/otra.db".to_string());
    assert_eq!(project.database_path(&global), PathBuf::from("/tmp/otra.db"));
}
