use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marginalia_annotate::{Annotator, AnnotatorConfig, AnnotatorSettings, DecoratorData};
use marginalia_editor::{range_walk, Editor};

fn document(paragraphs: usize) -> String {
    let mut html = String::new();
    for i in 0..paragraphs {
        html.push_str(&format!(
            r#"<p>Paragraph {i} with <b>bold</b> text<img src="{i}.png"> and <i>more</i></p>"#
        ));
        if i % 10 == 0 {
            html.push_str(r#"<figure class="image"><img src="f.png"><figcaption>Figure</figcaption></figure><hr>"#);
        }
    }
    html
}

fn annotator() -> Annotator {
    let mut annotator = Annotator::new(AnnotatorConfig::default()).unwrap();
    annotator.register("comment", AnnotatorSettings::default());
    annotator
}

fn annotate_small_document(c: &mut Criterion) {
    let html = document(5);
    c.bench_function("annotate_small_document", |b| {
        b.iter(|| {
            let mut annotator = annotator();
            let mut editor = Editor::from_html(black_box(&html)).unwrap();
            editor.select_all();
            annotator
                .annotate(&mut editor, "comment", DecoratorData::new())
                .unwrap()
        })
    });
}

fn annotate_large_document(c: &mut Criterion) {
    let html = document(200);
    c.bench_function("annotate_large_document", |b| {
        b.iter(|| {
            let mut annotator = annotator();
            let mut editor = Editor::from_html(black_box(&html)).unwrap();
            editor.select_all();
            annotator
                .annotate(&mut editor, "comment", DecoratorData::new())
                .unwrap()
        })
    });
}

fn walk_large_document(c: &mut Criterion) {
    let mut editor = Editor::from_html(&document(200)).unwrap();
    editor.select_all();
    let range = *editor.selection();
    c.bench_function("walk_large_document", |b| {
        b.iter(|| range_walk::walk(black_box(editor.document()), &range).unwrap())
    });
}

criterion_group!(
    benches,
    annotate_small_document,
    annotate_large_document,
    walk_large_document
);
criterion_main!(benches);
