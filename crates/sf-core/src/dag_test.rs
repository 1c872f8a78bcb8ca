use super::*;
use crate::table_spec::ColumnSpec;

fn table(name: &str, parents: &[&str]) -> TableSpec {
    let mut columns = vec![ColumnSpec::primary_key("Codigo")];
    for parent in parents {
        columns.push(
            ColumnSpec::new(&format!("Codigo_{}", parent), "INTEGER").references(parent, "Codigo"),
        );
    }
    TableSpec::new(name, columns)
}

fn clinic() -> Vec<TableSpec> {
    vec![
        table("consultas", &["pacientes", "doctor", "citas"]),
        table("receta", &["consultas", "pacientes", "doctor"]),
        table("citas", &["pacientes", "doctor"]),
        table("pacientes", &[]),
        table("doctor", &[]),
        table("usuarios_sistema", &[]),
    ]
}

fn position(order: &[TableName], name: &str) -> usize {
    order.iter().position(|t| t == name).unwrap()
}

#[test]
fn test_parents_come_first() {
    let dag = TableDag::build(&clinic()).unwrap();
    let order = dag.topological_order().unwrap();

    assert_eq!(order.len(), 6);
    assert!(position(&order, "pacientes") < position(&order, "citas"));
    assert!(position(&order, "doctor") < position(&order, "citas"));
    assert!(position(&order, "citas") < position(&order, "consultas"));
    assert!(position(&order, "consultas") < position(&order, "receta"));
}

#[test]
fn test_independent_tables_keep_declaration_order() {
    let dag = TableDag::build(&clinic()).unwrap();
    let order = dag.topological_order().unwrap();
    let names: Vec<&str> = order.iter().map(|t| t.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "pacientes",
            "doctor",
            "citas",
            "consultas",
            "receta",
            "usuarios_sistema"
        ]
    );
}

#[test]
fn test_self_and_external_references_ignored() {
    let specs = vec![
        table("empleados", &["empleados", "departamentos_externos"]),
        table("turnos", &["empleados"]),
    ];
    let dag = TableDag::build(&specs).unwrap();
    assert_eq!(dag.len(), 2);
    assert!(!dag.contains("departamentos_externos"));
    assert!(dag.dependencies("empleados").is_empty());
    assert_eq!(dag.dependencies("turnos"), vec![TableName::new("empleados")]);
}

#[test]
fn test_circular_dependency() {
    let specs = vec![table("a", &["b"]), table("b", &["c"]), table("c", &["a"])];
    let result = TableDag::build(&specs);
    assert!(matches!(
        result.unwrap_err(),
        CoreError::CircularDependency { .. }
    ));
}

#[test]
fn test_duplicate_table_rejected() {
    let specs = vec![table("pacientes", &[]), table("PACIENTES", &[])];
    assert!(matches!(
        TableDag::build(&specs).unwrap_err(),
        CoreError::DuplicateTable { .. }
    ));
}

#[test]
fn test_ancestors_and_descendants() {
    let dag = TableDag::build(&clinic()).unwrap();

    let ancestors: HashSet<String> = dag
        .ancestors("receta")
        .into_iter()
        .map(|t| t.into_inner())
        .collect();
    assert_eq!(ancestors.len(), 4);
    assert!(ancestors.contains("citas"));

    let descendants = dag.descendants("consultas");
    assert_eq!(descendants, vec![TableName::new("receta")]);
    assert_eq!(dag.dependents("citas"), vec![TableName::new("consultas")]);
}

#[test]
fn test_select_with_parents() {
    let dag = TableDag::build(&clinic()).unwrap();
    let selected = dag.select("+citas").unwrap();
    let names: Vec<&str> = selected.iter().map(|t| t.as_str()).collect();
    assert_eq!(names, vec!["pacientes", "doctor", "citas"]);
}

#[test]
fn test_select_with_children() {
    let dag = TableDag::build(&clinic()).unwrap();
    let selected = dag.select("Citas+").unwrap();
    let names: Vec<&str> = selected.iter().map(|t| t.as_str()).collect();
    assert_eq!(names, vec!["citas", "consultas", "receta"]);
}

#[test]
fn test_select_unknown_table() {
    let dag = TableDag::build(&clinic()).unwrap();
    assert!(matches!(
        dag.select("facturas").unwrap_err(),
        CoreError::UnknownTable { .. }
    ));
}
