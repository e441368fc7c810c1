use samyama_constraints::constraint::{parse_constraint, Constraint, ConstraintSet, Outcome};
use samyama_constraints::graph::{GraphStore, NodeId};

struct Company {
    store: GraphStore,
    person1: NodeId,
    person2: NodeId,
    manager: NodeId,
    company: NodeId,
    product: NodeId,
}

/// person2 works for two companies; both persons report to the manager
fn company_graph() -> Company {
    let mut store = GraphStore::new();
    let mut tx = store.begin();
    let company = tx.create_node(&["Company"]);
    let company2 = tx.create_node(&["Company"]);
    let person1 = tx.create_node(&["Person"]);
    tx.create_edge(person1, company, "WORKS_FOR").unwrap();
    let person2 = tx.create_node(&["Person"]);
    tx.create_edge(person2, company, "WORKS_FOR").unwrap();
    tx.create_edge(person2, company2, "WORKS_FOR").unwrap();
    let manager = tx.create_node(&["Person", "Manager"]);
    tx.create_edge(manager, company, "WORKS_FOR").unwrap();
    tx.create_edge(person1, manager, "REPORTS_TO").unwrap();
    tx.create_edge(person2, manager, "REPORTS_TO").unwrap();
    let product = tx.create_node(&["Product"]);
    tx.commit().unwrap();

    Company {
        store,
        person1,
        person2,
        manager,
        company,
        product,
    }
}

fn works_for() -> Constraint {
    parse_constraint("(:Person)-[:WORKS_FOR]->(:Company) TO many:1").unwrap()
}

fn reports_to() -> Constraint {
    parse_constraint("(:Person)-[:REPORTS_TO]->(:Manager) to 1..3:0..1").unwrap()
}

#[test]
fn test_matches_works_for() {
    let g = company_graph();
    let c = works_for();
    assert!(c.matches(&g.store, g.person1));
    assert!(c.matches(&g.store, g.manager));
    assert!(c.matches(&g.store, g.company));
    assert!(!c.matches(&g.store, g.product));
}

#[test]
fn test_matches_reports_to() {
    let g = company_graph();
    let c = reports_to();
    assert!(c.matches(&g.store, g.person1));
    assert!(c.matches(&g.store, g.manager));
    assert!(!c.matches(&g.store, g.company));
    assert!(!c.matches(&g.store, g.product));
}

#[test]
fn test_check_works_for() {
    let g = company_graph();
    let c = works_for();
    assert_eq!(c.check(&g.store, g.person1), Outcome::Ok);
    assert_eq!(c.check(&g.store, g.company), Outcome::Ok);
    assert_eq!(c.check(&g.store, g.manager), Outcome::Ok);
    assert_eq!(c.check(&g.store, g.person2), Outcome::TooMany);
}

#[test]
fn test_check_reports_to() {
    let g = company_graph();
    let c = reports_to();
    assert_eq!(c.check(&g.store, g.person1), Outcome::Ok);
    assert_eq!(c.check(&g.store, g.person2), Outcome::Ok);
    assert_eq!(c.check(&g.store, g.manager), Outcome::Ok);
    assert_eq!(c.check(&g.store, g.company), Outcome::Ok);
}

#[test]
fn test_set_check_reports_only_violations() {
    let g = company_graph();
    let set = ConstraintSet::from(vec![works_for(), reports_to()]);

    let violations = set.check(&g.store, g.person2).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.get(&works_for()), Some(&Outcome::TooMany));

    for node in [g.person1, g.manager, g.company, g.product] {
        assert!(set.check(&g.store, node).is_none(), "{} has violations", node);
    }
}

#[test]
fn test_undirected_self_loop_counted_once() {
    let mut store = GraphStore::new();
    let mut tx = store.begin();
    let a = tx.create_node(&["Person"]);
    tx.create_edge(a, a, "KNOWS").unwrap();
    tx.commit().unwrap();

    let at_most_one = parse_constraint("(:Person)-[:KNOWS]-(:Person) TO many:0..1").unwrap();
    assert_eq!(at_most_one.check(&store, a), Outcome::Ok);

    let exactly_two = parse_constraint("(:Person)-[:KNOWS]-(:Person) TO many:2").unwrap();
    assert_eq!(exactly_two.check(&store, a), Outcome::TooFew);
}

#[test]
fn test_incoming_pattern_equivalent_to_reversed_outgoing() {
    let g = company_graph();
    let employs = parse_constraint("(:Company)<-[:WORKS_FOR]-(:Person) TO 1:0..2").unwrap();

    // company has three employees, company2 one
    assert_eq!(employs.check_forward_role(&g.store, g.company), Outcome::TooMany);
    assert_eq!(employs.check_reverse_role(&g.store, g.person1), Outcome::Ok);
    assert_eq!(employs.check_reverse_role(&g.store, g.person2), Outcome::TooMany);
}
