use super::*;
use crate::area::model::{Area, AreaKind};
use crate::layout::status::Status;

fn page(number: u32, text: &str) -> FinishedPage {
    let mut area = Area::new(AreaKind::Page, 100.0, 100.0);
    area.attach(Area::line(text, 100.0, 10.0));
    FinishedPage {
        number,
        sequence: 0,
        blank: false,
        flow_status: Status::Ok,
        area,
    }
}

#[test]
fn in_memory_sink_collects_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig { sequences: 1 }).unwrap();
    sink.push_page(page(1, "a")).unwrap();
    sink.push_page(page(2, "b")).unwrap();
    sink.end().unwrap();
    assert!(sink.is_finished());
    assert_eq!(sink.config(), Some(SinkConfig { sequences: 1 }));
    assert_eq!(
        sink.pages.iter().map(|p| p.number).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn json_sink_writes_a_valid_array() {
    let mut sink = JsonSink::new(Vec::new());
    sink.begin(SinkConfig { sequences: 1 }).unwrap();
    sink.push_page(page(1, "first")).unwrap();
    sink.push_page(page(2, "second")).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.pages_written(), 2);

    let bytes = sink.into_inner();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let pages = v.as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1]["number"], 2);
    assert_eq!(pages[0]["area"]["children"][0]["text"], "first");
    assert_eq!(pages[0]["flow_status"], "ok");
}
