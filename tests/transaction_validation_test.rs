use samyama_constraints::graph::{EdgeId, GraphError, GraphStore, NodeId};
use samyama_constraints::hook::{ConstraintExtension, ValidationError, ValidationHook};
use samyama_constraints::persistence::{ConstraintPersister, MemoryPropertyStore, PropertyStore};
use samyama_constraints::{Outcome, TransactionEvents};
use std::sync::Arc;

const WORKS_FOR: &str = "(:Person)-[:WORKS_FOR]->(:Company) TO many:1";
const REPORTS_TO: &str = "(:Person)-[:REPORTS_TO]->(:Manager) to 1..3:0..1";

struct Fixture {
    store: GraphStore,
    _extension: ConstraintExtension<dyn TransactionEvents>,
}

fn setup() -> Fixture {
    let storage = Arc::new(MemoryPropertyStore::new());
    let persister = ConstraintPersister::new(Arc::clone(&storage));
    persister.define(WORKS_FOR).unwrap();
    persister.define(REPORTS_TO).unwrap();

    let store = GraphStore::new();
    let events: Arc<dyn TransactionEvents> = store.events();
    let extension = ConstraintExtension::new(events, ValidationHook::new(persister));
    assert!(extension.start());

    Fixture {
        store,
        _extension: extension,
    }
}

fn rejection(result: Result<(), GraphError>) -> samyama_constraints::ViolationReport {
    match result {
        Err(GraphError::TransactionRejected(veto)) => match veto.downcast_ref::<ValidationError>() {
            Some(ValidationError::ConstraintViolation(report)) => report.clone(),
            other => panic!("expected a constraint violation, got {:?}", other),
        },
        other => panic!("expected a constraint violation, got {:?}", other),
    }
}

/// Person and Company linked by WORKS_FOR, plus a Person+Manager the person reports to
fn person_with_manager(store: &mut GraphStore) -> (NodeId, NodeId) {
    let mut tx = store.begin();
    let company = tx.create_node(&["Company"]);
    let person = tx.create_node(&["Person"]);
    tx.create_edge(person, company, "WORKS_FOR").unwrap();
    let manager = tx.create_node(&["Person", "Manager"]);
    tx.create_edge(manager, company, "WORKS_FOR").unwrap();
    tx.create_edge(person, manager, "REPORTS_TO").unwrap();
    tx.commit().unwrap();
    (person, manager)
}

#[test]
fn test_lone_person_rejected() {
    let mut f = setup();
    let mut tx = f.store.begin();
    let person = tx.create_node(&["Person"]);
    let report = rejection(tx.commit());

    let violations = report.get(person).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.values().next(), Some(&Outcome::TooFew));
    assert!(report.to_string().starts_with("Nodes violated cardinality constraints:"));

    // Rolled back
    assert_eq!(f.store.node_count(), 0);
}

#[test]
fn test_lone_company_accepted() {
    let mut f = setup();
    let mut tx = f.store.begin();
    tx.create_node(&["Company"]);
    tx.commit().unwrap();
    assert_eq!(f.store.node_count(), 1);
}

#[test]
fn test_lone_manager_rejected() {
    let mut f = setup();
    let mut tx = f.store.begin();
    let manager = tx.create_node(&["Manager"]);
    let report = rejection(tx.commit());
    assert_eq!(report.get(manager).unwrap().values().next(), Some(&Outcome::TooFew));
}

#[test]
fn test_add_manager_label_rejected() {
    let mut f = setup();
    let mut tx = f.store.begin();
    let company = tx.create_node(&["Company"]);
    let person = tx.create_node(&["Person"]);
    tx.create_edge(person, company, "WORKS_FOR").unwrap();
    tx.add_label(person, "Manager").unwrap();
    let report = rejection(tx.commit());
    assert_eq!(report.nodes().collect::<Vec<_>>(), vec![person]);
}

#[test]
fn test_person_with_company_accepted() {
    let mut f = setup();
    let mut tx = f.store.begin();
    let company = tx.create_node(&["Company"]);
    let person = tx.create_node(&["Person"]);
    tx.create_edge(person, company, "WORKS_FOR").unwrap();
    tx.commit().unwrap();
    assert_eq!(f.store.edge_count(), 1);
}

#[test]
fn test_person_with_manager_accepted() {
    let mut f = setup();
    person_with_manager(&mut f.store);
    assert_eq!(f.store.node_count(), 3);
    assert_eq!(f.store.edge_count(), 3);
}

#[test]
fn test_removing_reports_rejected() {
    let mut f = setup();
    let (_, manager) = person_with_manager(&mut f.store);

    let reports: Vec<EdgeId> = f
        .store
        .get_incoming_edges(manager)
        .into_iter()
        .filter(|e| e.edge_type.as_str() == "REPORTS_TO")
        .map(|e| e.id)
        .collect();
    assert_eq!(reports.len(), 1);

    let mut tx = f.store.begin();
    for id in reports {
        tx.delete_edge(id).unwrap();
    }
    let report = rejection(tx.commit());
    assert_eq!(report.get(manager).unwrap().values().next(), Some(&Outcome::TooFew));

    // The relationship is back
    assert_eq!(f.store.edge_count(), 3);
}

#[test]
fn test_removing_manager_label_only_rechecks_that_node() {
    let mut f = setup();
    let (_, manager) = person_with_manager(&mut f.store);

    let mut tx = f.store.begin();
    tx.remove_label(manager, "Manager").unwrap();
    tx.commit().unwrap();
}

#[test]
fn test_second_employer_rejected() {
    let mut f = setup();
    let mut tx = f.store.begin();
    let company = tx.create_node(&["Company"]);
    let company2 = tx.create_node(&["Company"]);
    let person = tx.create_node(&["Person"]);
    tx.create_edge(person, company, "WORKS_FOR").unwrap();
    tx.create_edge(person, company2, "WORKS_FOR").unwrap();
    let report = rejection(tx.commit());
    assert_eq!(report.get(person).unwrap().values().next(), Some(&Outcome::TooMany));
    assert_eq!(report.node_count(), 1);
}

#[test]
fn test_deleting_employer_rejected() {
    let mut f = setup();
    let (person, _) = person_with_manager(&mut f.store);
    let company = f
        .store
        .get_outgoing_edges(person)
        .into_iter()
        .find(|e| e.edge_type.as_str() == "WORKS_FOR")
        .map(|e| e.target)
        .unwrap();

    let mut tx = f.store.begin();
    tx.delete_node(company).unwrap();
    let report = rejection(tx.commit());
    // Both employees lost their company; the deleted node itself is not reported
    assert_eq!(report.node_count(), 2);
    assert!(report.get(company).is_none());
    assert!(f.store.has_node(company));
}

#[test]
fn test_unconstrained_nodes_accepted() {
    let mut f = setup();
    let mut tx = f.store.begin();
    let a = tx.create_node(&["Product"]);
    let b = tx.create_node(&[]);
    tx.create_edge(a, b, "KNOWS").unwrap();
    tx.commit().unwrap();
}

#[test]
fn test_property_writes_skip_validation() {
    let mut f = setup();
    let mut tx = f.store.begin();
    let company = tx.create_node(&["Company"]);
    tx.commit().unwrap();

    let mut tx = f.store.begin();
    tx.set_node_property(company, "name", "Acme").unwrap();
    tx.commit().unwrap();
}

#[test]
fn test_stopped_extension_enforces_nothing() {
    let storage = Arc::new(MemoryPropertyStore::new());
    let persister = ConstraintPersister::new(Arc::clone(&storage));
    persister.define(WORKS_FOR).unwrap();
    assert!(storage.get("CONSTRAINT").unwrap().is_some());

    let mut store = GraphStore::new();
    let extension = ConstraintExtension::new(store.events(), ValidationHook::new(persister));
    extension.start();
    extension.stop();

    let mut tx = store.begin();
    tx.create_node(&["Person"]);
    tx.commit().unwrap();
}

#[test]
fn test_constraints_defined_later_apply_to_next_transaction() {
    let storage = Arc::new(MemoryPropertyStore::new());
    let mut store = GraphStore::new();
    let extension = ConstraintExtension::new(
        store.events(),
        ValidationHook::new(ConstraintPersister::new(Arc::clone(&storage))),
    );
    extension.start();

    let mut tx = store.begin();
    tx.create_node(&["Person"]);
    tx.commit().unwrap();

    ConstraintPersister::new(Arc::clone(&storage)).define(WORKS_FOR).unwrap();

    let mut tx = store.begin();
    tx.create_node(&["Person"]);
    assert!(tx.commit().is_err());
}
