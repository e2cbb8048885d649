use std::sync::{Arc, RwLock};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pastiera_core::ngram::builder::NgramBuilder;
use pastiera_core::{
    NextWordPredictor, NgramLanguageModel, Normalizer, UserLearningStore, WordEntry,
    WordListDictionary,
};

static CORPUS: &str = "\
how are you today
how are you doing
how are they
i would like a pizza
i would like to go home
i like pizza and pasta
good morning everyone
good morning to you
good night and see you soon
see you later
see you tomorrow morning
are you coming home tonight
we are going to the beach
they are going home";

fn bench_model() -> Arc<NgramLanguageModel> {
    let mut builder = NgramBuilder::new();
    // Repeat so counts are not all ones.
    for _ in 0..10 {
        builder.add_text(CORPUS);
    }
    let tables = builder.build(1);

    let entries = CORPUS
        .split_whitespace()
        .enumerate()
        .map(|(i, w)| WordEntry::new(w, 1000 + (i as u32 * 37) % 4000))
        .collect();
    let dict = Arc::new(WordListDictionary::from_entries(entries));
    let model = Arc::new(NgramLanguageModel::new(dict, Arc::new(Normalizer::default())));
    model.load_ngrams(tables);
    model
}

fn bench_learning() -> Arc<RwLock<UserLearningStore>> {
    let mut learning = UserLearningStore::new(Arc::new(Normalizer::default()));
    for line in CORPUS.lines().take(6) {
        let words: Vec<&str> = line.split_whitespace().collect();
        learning.record_sequence(&words);
    }
    learning.record_sequence(&["i", "would", "like", "sushi"]);
    Arc::new(RwLock::new(learning))
}

static CONTEXTS: &[(&str, &[&str])] = &[
    ("trigram", &["how", "are"]),
    ("bigram", &["see"]),
    ("unigram", &["zebra"]),
];

fn bench_base_model(c: &mut Criterion) {
    let model = bench_model();
    let mut group = c.benchmark_group("predict/base");
    for &(label, context) in CONTEXTS {
        group.bench_with_input(BenchmarkId::new(label, context.len()), &context, |b, &ctx| {
            b.iter(|| model.predict_next(ctx, 5));
        });
    }
    group.finish();
}

fn bench_personalized(c: &mut Criterion) {
    let predictor = NextWordPredictor::new(bench_model(), Some(bench_learning()));
    let mut group = c.benchmark_group("predict/personalized");
    for &(label, context) in CONTEXTS {
        group.bench_with_input(BenchmarkId::new(label, context.len()), &context, |b, &ctx| {
            b.iter(|| predictor.predict(ctx, 5));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_base_model, bench_personalized);
criterion_main!(benches);
