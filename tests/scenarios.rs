//! End-to-end movement scenarios through flat and nested graphs.

use stategraph::{
    signal, Callback, Config, Emitter, Graph, GraphError, ListenerRegistry, Node, ReentryPolicy,
    Request,
};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

/// Define `name` under `path`, logging `+label:args` on entry and `-label` on leave.
///
/// Both hooks also check that the chain ends with the state itself.
fn tracked(
    graph: &Graph<String>,
    path: &[&str],
    name: &str,
    label: &str,
    log: &Log,
) -> Node<String> {
    let on_enter = Rc::clone(log);
    let enter_label = label.to_string();
    let own_name = name.to_string();
    let depth = path.len();
    let node = graph
        .define_at(path.iter().copied(), name, move |chain, args| {
            assert_eq!(chain.len(), depth + 1);
            assert_eq!(chain[depth].name(), own_name);
            let mut entry = vec![format!("+{enter_label}")];
            entry.extend(args.iter().cloned());
            on_enter.borrow_mut().push(entry.join(":"));
        })
        .unwrap();

    let on_leave = Rc::clone(log);
    let leave_label = label.to_string();
    let own_name = name.to_string();
    node.on(signal::LEAVE, move |chain, args| {
        assert_eq!(chain.len(), depth + 1);
        assert_eq!(chain[depth].name(), own_name);
        assert!(args.is_empty());
        on_leave.borrow_mut().push(format!("-{leave_label}"));
    });
    node
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn flat_graph_movement() {
    let log: Log = Rc::default();
    let graph = Graph::new();

    let a = tracked(&graph, &[], "a", "a", &log);
    assert_eq!(graph.get("a"), Some(a.clone()));

    assert_eq!(graph.go("a", args(&["foo", "bar"])).unwrap(), a);
    assert_eq!(graph.go("a", vec![]).unwrap(), a);
    assert_eq!(graph.current(), Some(a.clone()));
    graph.end();

    let b = tracked(&graph, &[], "b", "b", &log);
    let c = tracked(&graph, &[], "c", "c", &log);
    let d = tracked(&graph, &[], "d", "d", &log);

    assert_eq!(graph.go("b", args(&["foo"])).unwrap(), b);
    assert_eq!(graph.current(), Some(b));
    assert_eq!(graph.go("a", vec![]).unwrap(), a);
    assert_eq!(graph.current(), Some(a));
    assert_eq!(graph.go("d", args(&["1", "2", "3"])).unwrap(), d);
    assert_eq!(graph.current(), Some(d));
    assert_eq!(graph.go("c", args(&[""])).unwrap(), c);
    assert_eq!(graph.current(), Some(c.clone()));
    graph.end();
    graph.go("c", args(&["false", "foo"])).unwrap();
    assert_eq!(graph.current(), Some(c));

    let err = graph.go("foobar", vec![]).unwrap_err();
    assert_eq!(err.to_string(), "state 'foobar' does not exist in <root>");

    assert_eq!(
        log.borrow().join(","),
        "+a:foo:bar,-a,+b:foo,-b,+a,-a,+d:1:2:3,-d,+c:,-c,+c:false:foo"
    );
}

#[test]
fn nested_graph_movement() {
    let log: Log = Rc::default();
    let graph = Graph::new();

    let a = tracked(&graph, &[], "a", "a", &log);
    assert!(a.subgraph().is_none());

    let a_1 = tracked(&graph, &["a"], "1", "a_1", &log);
    assert_eq!(a.child("1"), Some(a_1.clone()));
    let a_2 = tracked(&graph, &["a"], "2", "a_2", &log);
    assert_eq!(a.child("2"), Some(a_2.clone()));

    assert_eq!(graph.current(), None);
    assert_eq!(graph.go("a", vec![]).unwrap(), a);
    assert_eq!(graph.current(), Some(a.clone()));
    assert_eq!(a.current(), None);
    assert_eq!(graph.current().unwrap().go("1", vec![]).unwrap(), a_1);
    assert_eq!(a.current(), Some(a_1.clone()));
    assert_eq!(graph.current().unwrap().go("2", vec![]).unwrap(), a_2);
    assert_eq!(a.current(), Some(a_2.clone()));
    graph.end();
    assert_eq!(graph.current(), None);

    let b = tracked(&graph, &[], "b", "b", &log);

    assert_eq!(graph.go("b", args(&["foo", "bar"])).unwrap(), b);
    assert_eq!(graph.go("a", vec![]).unwrap(), a);
    assert_eq!(a.current(), None);
    assert_eq!(a.go("2", args(&["1", "2", "3"])).unwrap(), a_2);
    assert_eq!(a.go("1", args(&["", "false"])).unwrap(), a_1);
    assert_eq!(a.go("2", vec![]).unwrap(), a_2);
    assert_eq!(graph.go("b", args(&["1"])).unwrap(), b);
    graph.end();
    assert_eq!(graph.current(), None);

    assert_eq!(
        log.borrow().join(","),
        "+a,+a_1,-a_1,+a_2,-a_2,-a,+b:foo:bar,-b,+a,+a_2:1:2:3,-a_2,\
         +a_1::false,-a_1,+a_2,-a_2,-a,+b:1,-b"
    );
}

#[test]
fn nested_definition_then_stepwise_descent() {
    let log: Log = Rc::default();
    let graph = Graph::new();

    let a = tracked(&graph, &[], "a", "a", &log);
    tracked(&graph, &["a"], "1", "a.1", &log);
    let two = tracked(&graph, &["a"], "2", "a.2", &log);

    graph.go("a", vec![]).unwrap();
    graph.current().unwrap().go("1", vec![]).unwrap();
    graph.current().unwrap().go("2", vec![]).unwrap();

    assert_eq!(graph.active_path(), vec![a, two]);
    assert_eq!(*log.borrow(), vec!["+a", "+a.1", "-a.1", "+a.2"]);
}

#[test]
fn ending_root_leaves_deepest_first() {
    let log: Log = Rc::default();
    let graph = Graph::new();
    tracked(&graph, &[], "a", "A", &log);
    tracked(&graph, &["a"], "b", "B", &log);
    let c = tracked(&graph, &["a", "b"], "c", "C", &log);

    c.jump(vec![]).unwrap();
    log.borrow_mut().clear();
    graph.end();

    assert_eq!(*log.borrow(), vec!["-C", "-B", "-A"]);
    assert!(graph.active_path().is_empty());
}

#[test]
fn jump_threads_arguments_to_final_hop_only() {
    let log: Log = Rc::default();
    let graph = Graph::new();
    tracked(&graph, &[], "r", "R", &log);
    tracked(&graph, &["r"], "a", "A", &log);
    tracked(&graph, &["r", "a"], "b", "B", &log);
    let n = tracked(&graph, &["r", "a", "b"], "n", "N", &log);
    tracked(&graph, &[], "other", "O", &log);

    graph.go("other", vec![]).unwrap();
    n.jump(args(&["x", "y"])).unwrap();

    assert_eq!(*log.borrow(), vec!["+O", "-O", "+R", "+A", "+B", "+N:x:y"]);
}

#[test]
fn jump_between_cousins_leaves_the_old_branch() {
    let log: Log = Rc::default();
    let graph = Graph::new();
    tracked(&graph, &[], "menu", "menu", &log);
    let options = tracked(&graph, &["menu"], "options", "options", &log);
    tracked(&graph, &[], "game", "game", &log);
    let paused = tracked(&graph, &["game"], "paused", "paused", &log);

    options.jump(vec![]).unwrap();
    paused.jump(args(&["esc"])).unwrap();
    options.jump(vec![]).unwrap();

    assert_eq!(
        log.borrow().join(","),
        "+menu,+options,-options,-menu,+game,+paused:esc,-paused,-game,+menu,+options"
    );
}

#[test]
fn proxy_lookup_and_definition_through_state() {
    let graph = Graph::<String>::new();
    graph.define("a", |_, _| {}).unwrap();

    let c = graph
        .state(Request::from_parts(&["a", "b"], None).unwrap())
        .unwrap();
    assert_eq!(c, None);

    let entry: Callback<String> = Rc::new(|_: &[Node<String>], _: &[String]| {});
    let request = Request::from_parts(&["a", "b"], Some(entry)).unwrap();
    let b = graph.state(request).unwrap().unwrap();
    assert_eq!(b.qualified_name(), "a.b");

    let deep = Request::nested(["a", "b"], Request::define("c", |_, _| {}));
    let c = graph.state(deep).unwrap().unwrap();
    let chain = c.path().unwrap();
    let names: Vec<_> = chain.iter().map(Node::name).collect();
    assert_eq!(names, ["a", "b", "c"]);

    let lookup = Request::from_parts(&["a", "b", "c"], None).unwrap();
    assert_eq!(graph.state(lookup).unwrap(), Some(c));

    let missing = Request::from_parts(&["a", "zzz", "c"], None).unwrap();
    assert!(matches!(
        graph.state(missing),
        Err(GraphError::NotFound { ref name, .. }) if name == "zzz"
    ));
}

fn rejecting() -> Graph<String> {
    Graph::with_config(Config::builder().reentry(ReentryPolicy::Reject).build())
}

#[test]
fn rejected_jump_to_active_target_fires_nothing() {
    let log: Log = Rc::default();
    let graph = rejecting();
    tracked(&graph, &[], "menu", "menu", &log);
    let options = tracked(&graph, &["menu"], "options", "options", &log);

    options.jump(vec![]).unwrap();
    log.borrow_mut().clear();

    let err = options.jump(args(&["again"])).unwrap_err();
    assert_eq!(
        err,
        GraphError::AlreadyActive {
            name: "options".to_string()
        }
    );
    assert!(log.borrow().is_empty());
    assert_eq!(graph.active_path().len(), 2);
}

#[test]
fn rejecting_graph_still_jumps_below_active_ancestor() {
    let log: Log = Rc::default();
    let graph = rejecting();
    tracked(&graph, &[], "menu", "menu", &log);
    tracked(&graph, &["menu"], "options", "options", &log);
    let audio = tracked(&graph, &["menu", "options"], "audio", "audio", &log);

    graph.go("menu", vec![]).unwrap();
    assert_eq!(audio.jump(args(&["loud"])).unwrap(), audio);

    assert_eq!(*log.borrow(), vec!["+menu", "+options", "+audio:loud"]);
    assert_eq!(graph.active_path().last(), Some(&audio));
}

#[test]
fn nested_redefinition_names_the_nested_scope() {
    let graph = Graph::<String>::new();
    graph.define("a", |_, _| {}).unwrap();
    let original = graph.define_at(["a"], "b", |_, _| {}).unwrap();
    graph.define_at(["a", "b"], "c", |_, _| {}).unwrap();

    let err = graph
        .state(Request::nested(["a"], Request::define("b", |_, _| {})))
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::AlreadyDefined {
            name: "b".to_string(),
            scope: "a".to_string(),
        }
    );

    let err = graph
        .state(Request::nested(["a", "b"], Request::define("c", |_, _| {})))
        .unwrap_err();
    assert_eq!(err.to_string(), "state 'c' is already defined in a.b");
    assert_eq!(graph.get("a").unwrap().child("b"), Some(original));
}

/// Emitter that records every emission into a shared journal on top of the
/// default listener behavior.
struct Journal {
    inner: ListenerRegistry<String>,
    entries: Rc<RefCell<Vec<String>>>,
}

impl Emitter<String> for Journal {
    fn subscribe(&self, signal: &str, listener: Callback<String>) {
        self.inner.subscribe(signal, listener);
    }

    fn emit(&self, signal: &str, chain: &[Node<String>], args: &[String]) {
        let path: Vec<_> = chain.iter().map(Node::name).collect();
        self.entries
            .borrow_mut()
            .push(format!("{signal}({})", path.join(".")));
        self.inner.emit(signal, chain, args);
    }

    fn listener_count(&self, signal: &str) -> usize {
        self.inner.listener_count(signal)
    }
}

#[test]
fn pluggable_emitter_sees_every_lifecycle_signal() {
    let entries = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&entries);
    let config = Config::<String>::builder()
        .emitter(move || {
            Box::new(Journal {
                inner: ListenerRegistry::new(),
                entries: Rc::clone(&sink),
            }) as Box<dyn Emitter<String>>
        })
        .build();
    let graph = Graph::with_config(config);

    graph.define("a", |_, _| {}).unwrap();
    graph.define_at(["a"], "1", |_, _| {}).unwrap();
    graph.define_at(["a"], "2", |_, _| {}).unwrap();

    graph.go("a", vec![]).unwrap();
    graph.current().unwrap().go("1", vec![]).unwrap();
    graph.current().unwrap().go("2", vec![]).unwrap();
    graph.end();

    assert_eq!(
        *entries.borrow(),
        vec!["enter(a)", "enter(a.1)", "leave(a.1)", "enter(a.2)", "leave(a.2)", "leave(a)"]
    );
}
