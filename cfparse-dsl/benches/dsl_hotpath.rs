use cfparse_dsl::{parse, parse_source, CollectingWarnings, Lexer, Namespace, ParseCache};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const MODEL: &str = r#"
"""
Benchmark model
"""
import std

entity Host:
    """ A machine """
    string name
    string[] tags = ["a", "b"]
    dict? labels = null
    int port = 22
end

entity File extends std::Entity:
    string path
    string content = "{{ path }}"
end

Host.files [0:] -- File.host [1]

implementation hostDefaults for Host:
    self.port = 2222
    for tag in self.tags:
        if tag == "a":
            x = f"tag {tag}"
        elif tag in ["b", "c"]:
            y = [t for t in self.tags if t != tag]
        else:
            z = tag is defined
        end
    end
end

implement Host using hostDefaults when self.name != "localhost"

typedef hostname as string matching /^[a-z0-9.-]+$/

h = Host(name="web-1", tags=["x"])
f = File(host=h, path="/etc/motd")
"#;

fn bench_lexer(c: &mut Criterion) {
    c.bench_function("dsl/lex_model", |b| {
        b.iter(|| {
            let tokens = Lexer::new(black_box(MODEL)).tokenize();
            black_box(tokens.len());
        });
    });
}

fn bench_parse(c: &mut Criterion) {
    let ns = Namespace::root();
    c.bench_function("dsl/parse_model", |b| {
        b.iter(|| {
            let sink = CollectingWarnings::new();
            let statements =
                parse_source(&ns, "bench.cf", black_box(MODEL), &sink).expect("parse model");
            black_box(statements.len());
        });
    });
}

fn bench_cached_parse(c: &mut Criterion) {
    let ns = Namespace::root();
    let cache = ParseCache::new();
    parse(&cache, &ns, "bench.cf", Some(MODEL)).expect("warm cache");

    c.bench_function("dsl/parse_model_cached", |b| {
        b.iter(|| {
            let statements =
                parse(&cache, &ns, "bench.cf", Some(black_box(MODEL))).expect("cached parse");
            black_box(statements.len());
        });
    });
}

criterion_group!(benches, bench_lexer, bench_parse, bench_cached_parse);
criterion_main!(benches);
