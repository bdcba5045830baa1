use super::*;

#[test]
fn task_id_round_trips_through_display() {
    let id = TaskId::new("t1");
    assert_eq!(id.to_string(), "t1");
    assert_eq!(id, "t1");
}

#[test]
fn task_id_from_string_and_str_agree() {
    let a = TaskId::from("t1".to_string());
    let b = TaskId::from("t1");
    assert_eq!(a, b);
}

#[test]
fn scheme_code_usable_as_hashmap_key_borrowed_as_str() {
    use std::collections::HashMap;
    let mut map: HashMap<SchemeCode, u32> = HashMap::new();
    map.insert(SchemeCode::new("SCM-WF02"), 1);
    assert_eq!(map.get("SCM-WF02"), Some(&1));
}
