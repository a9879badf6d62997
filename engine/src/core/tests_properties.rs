//! Whole-document properties exercised over pseudo-random edit sequences.

use crate::core::{
    document::Document,
    model::SubtitleRow,
    time::{FrameRate, SubtitleTime},
    SubtitleId,
};

/// xorshift64, enough to drive reproducible edit sequences
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

fn snapshot(document: &Document) -> Vec<(SubtitleId, SubtitleRow)> {
    document
        .model()
        .subtitles
        .iter()
        .map(|(id, row)| (id, row.clone()))
        .collect()
}

fn ids(document: &Document) -> Vec<SubtitleId> {
    document.subtitles().iter().map(|s| s.id()).collect()
}

fn assert_invariants(document: &Document) {
    let subtitles: Vec<_> = document.subtitles().iter().collect();
    for (i, sub) in subtitles.iter().enumerate() {
        assert_eq!(sub.num(), i + 1, "numbering");
        assert_eq!(
            sub.duration_value(),
            sub.end_value() - sub.start_value(),
            "duration of #{}",
            sub.num()
        );
    }
    for pair in subtitles.windows(2) {
        assert_eq!(pair[0].gap_after(), pair[1].gap_before(), "gap reciprocity");
        assert_eq!(
            pair[0].gap_after().totalmsecs(),
            pair[1].start().totalmsecs() - pair[0].end().totalmsecs()
        );
    }
}

/// One random structural or timing edit
fn random_edit(document: &mut Document, rng: &mut Rng) {
    let current = ids(document);
    let pick = |rng: &mut Rng| current[rng.below(current.len())];

    match (current.is_empty(), rng.below(6)) {
        (true, _) | (false, 0) => {
            document.subtitles_mut().append().unwrap();
        }
        (false, 1) => {
            let id = pick(rng);
            document.subtitles_mut().insert_before(id).unwrap();
        }
        (false, 2) => {
            let id = pick(rng);
            document.subtitles_mut().insert_after(id).unwrap();
        }
        (false, 3) => {
            let mut batch: Vec<SubtitleId> = (0..=rng.below(3)).map(|_| pick(rng)).collect();
            batch.sort();
            batch.dedup();
            document.subtitles_mut().remove(&batch).unwrap();
        }
        (false, 4) => {
            let id = pick(rng);
            let start = rng.below(60_000) as i64;
            let end = start + rng.below(5_000) as i64;
            document
                .subtitle_mut(id)
                .unwrap()
                .set_start_and_end(SubtitleTime::new(start), SubtitleTime::new(end))
                .unwrap();
        }
        _ => {
            let id = pick(rng);
            let text = "word ".repeat(rng.below(12));
            document.subtitle_mut(id).unwrap().set_text(&text).unwrap();
        }
    }
}

#[test]
fn numbering_duration_and_gaps_hold_after_every_edit() {
    let mut rng = Rng(0x5eed_1234);
    let mut document = Document::new();
    for _ in 0..400 {
        random_edit(&mut document, &mut rng);
        assert_invariants(&document);
    }
}

#[test]
fn undo_all_then_redo_all_restores_states() {
    let mut rng = Rng(0xdead_beef);
    let mut document = Document::new();
    let initial = snapshot(&document);

    let groups = 12;
    for i in 0..groups {
        assert!(document.start_command(format!("Edit {}", i)));
        for _ in 0..=rng.below(5) {
            random_edit(&mut document, &mut rng);
        }
        document.finish_command();
    }
    let edited = snapshot(&document);
    let committed = document.command_system().undo_count();
    assert!(committed > 0 && committed <= groups);

    while document.undo().unwrap() {
        assert_invariants(&document);
    }
    assert_eq!(snapshot(&document), initial);

    while document.redo().unwrap() {
        assert_invariants(&document);
    }
    assert_eq!(snapshot(&document), edited);
}

#[test]
fn frame_time_round_trip_within_one_frame() {
    for framerate in FrameRate::ALL {
        let fps = framerate.value();
        for frame in (0..20_000).chain([86_400 * 30, 10_000_000]) {
            let back = SubtitleTime::time_to_frame(SubtitleTime::frame_to_time(frame, fps), fps);
            assert!(
                (back - frame).abs() <= 1,
                "{} fps: {} -> {}",
                framerate.label(),
                frame,
                back
            );
        }
    }
}

#[test]
fn batch_remove_is_one_undo_unit() {
    let mut document = Document::new();
    for i in 0..8 {
        let id = document.subtitles_mut().append().unwrap();
        let start = i * 1000;
        document
            .subtitle_mut(id)
            .unwrap()
            .set_start_and_end(SubtitleTime::new(start), SubtitleTime::new(start + 800))
            .unwrap();
        document
            .subtitle_mut(id)
            .unwrap()
            .set_text(&format!("line {}", i))
            .unwrap();
    }
    let before = snapshot(&document);
    let all = ids(&document);

    document.start_command("Delete");
    let removed = document
        .subtitles_mut()
        .remove(&[all[1], all[2], all[5], all[7]])
        .unwrap();
    document.finish_command();

    assert_eq!(removed, 4);
    assert_eq!(document.command_system().undo_count(), 1);
    assert_invariants(&document);

    document.undo().unwrap();
    assert_eq!(snapshot(&document), before);
}

#[test]
fn sort_by_time_is_stable_and_detects_sorted_input() {
    let mut document = Document::new();
    let starts = [3000, 1000, 1000, 0, 2000];
    for start in starts {
        let id = document.subtitles_mut().append().unwrap();
        document
            .subtitle_mut(id)
            .unwrap()
            .set_start_and_end(SubtitleTime::new(start), SubtitleTime::new(start + 500))
            .unwrap();
    }
    let original = ids(&document);

    document.start_command("Sort");
    let moved = document.subtitles_mut().sort_by_time().unwrap();
    document.finish_command();

    assert_eq!(moved, 5);
    // Equal starts keep their relative order
    assert_eq!(
        ids(&document),
        vec![original[3], original[1], original[2], original[4], original[0]]
    );
    assert_invariants(&document);

    document.start_command("Sort again");
    assert_eq!(document.subtitles_mut().sort_by_time().unwrap(), 0);
    assert!(document.finish_command().is_none());
    assert_eq!(document.command_system().undo_count(), 1);

    document.undo().unwrap();
    assert_eq!(ids(&document), original);
}

#[test]
fn basic_edit_and_undo() {
    let mut document = Document::new();
    let id = document.subtitles_mut().append().unwrap();

    document.start_command("Set time");
    {
        let mut sub = document.subtitle_mut(id).unwrap();
        sub.set_start("0:00:01.000".parse().unwrap()).unwrap();
        sub.set_end("0:00:03.000".parse().unwrap()).unwrap();
    }
    document.finish_command();
    assert_eq!(document.subtitle(id).unwrap().duration().totalmsecs(), 2000);

    document.undo().unwrap();
    let sub = document.subtitle(id).unwrap();
    assert_eq!(sub.duration().totalmsecs(), 0);
    assert_eq!(sub.start(), SubtitleTime::ZERO);
    assert_eq!(sub.end(), SubtitleTime::ZERO);
}

#[test]
fn cps_check_scenario() {
    let mut document = Document::new();
    let id = document.subtitles_mut().append().unwrap();
    {
        let mut sub = document.subtitle_mut(id).unwrap();
        // 30 visible characters once the tags are gone
        sub.set_text("<i>abcdefghijklmno</i>{\\b1}pqrstuvwxyzabcd")
            .unwrap();
        sub.set_start_and_end(SubtitleTime::new(0), SubtitleTime::new(2000))
            .unwrap();
    }
    let sub = document.subtitle(id).unwrap();
    assert_eq!(sub.characters_per_second_text(), 15.0);
    assert_eq!(sub.check_cps_text(0.0, 10.0), 1);
    assert_eq!(sub.check_cps_text(0.0, 20.0), 0);
}

#[test]
fn time_string_scenario() {
    let time: SubtitleTime = "1:02:03.456".parse().unwrap();
    assert_eq!(time.to_string(), "1:02:03.456");

    let second: SubtitleTime = "0:00:01.000".parse().unwrap();
    assert_eq!(
        SubtitleTime::new(-second.totalmsecs()).to_string(),
        "-0:00:01.000"
    );
}
