mod common;

use pythia::ast::builder::*;
use pythia::ast::{ComparisonOperator, Node};
use pythia::translator::TranslationError;
use pythia::Backend;

/// Two clusters with unit variance; `z[i]` picks the cluster of `data[i]`.
fn gaussian_mixture_model() -> Node {
    let vector = |size: Node| call_with(name("Vector"), vec![size], vec![keyword("t", name("float"))]);
    let indexed = |address: &str| call("IndexedAddress", vec![string(address), name("i")]);
    module(vec![model(
        "gaussian_mixture_model",
        &["data"],
        vec![
            assign(name("number_of_clusters"), int(2)),
            assign(
                name("probability"),
                call("sample", vec![string("probability"), call("Uniform", vec![int(0), int(1)])]),
            ),
            assign(name("mu"), vector(name("number_of_clusters"))),
            for_range(
                "i",
                vec![int(0), name("number_of_clusters")],
                vec![assign(
                    subscript(name("mu"), name("i")),
                    call("sample", vec![indexed("mu"), call("Normal", vec![int(0), int(1)])]),
                )],
            ),
            assign(name("z"), vector(call("len", vec![name("data")]))),
            for_range(
                "i",
                vec![int(0), call("len", vec![name("data")])],
                vec![
                    assign(
                        subscript(name("z"), name("i")),
                        call("sample", vec![indexed("z"), call("Bernoulli", vec![name("probability")])]),
                    ),
                    expression(call(
                        "observe",
                        vec![
                            subscript(name("data"), name("i")),
                            indexed("data"),
                            call(
                                "Normal",
                                vec![subscript(name("mu"), subscript(name("z"), name("i"))), int(1)],
                            ),
                        ],
                    )),
                ],
            ),
        ],
    )])
}

fn translate(backend: Backend, tree: &Node) -> String {
    backend
        .translator()
        .with_validation(pythia::validate)
        .translate(tree)
        .expect("translation failed")
}

#[test]
fn gaussian_mixture_model_in_pyro() {
    let expected = r#"import pyro
import pyro.distributions as dist
import torch
def gaussian_mixture_model(data):
    number_of_clusters = 2
    probability = pyro.sample('probability', dist.Uniform(0, 1))
    mu = torch.full((number_of_clusters,), 0, dtype=float)
    for i in range(0, number_of_clusters, 1):
        mu[i] = pyro.sample(f"{'mu'}[{i}]", dist.Normal(0, 1))
    z = torch.full((len(data),), 0, dtype=float)
    for i in range(0, len(data), 1):
        z[i] = pyro.sample(f"{'z'}[{i}]", dist.Bernoulli(probability))
        pyro.sample(f"{'data'}[{i}]", dist.Normal(mu[z[i]], 1), obs=data[i])"#;
    common::assert_lines_eq(expected, &translate(Backend::Pyro, &gaussian_mixture_model()));
}

#[test]
fn gaussian_mixture_model_in_turing() {
    let expected = r#"using Turing
@model function gaussian_mixture_model(data)
    number_of_clusters = 2
    probability ~ Uniform(0, 1)
    mu = fill!(Array{Float64}(undef, number_of_clusters), 0)
    for i = 0:1:(number_of_clusters)-1
        mu[(i)+1] ~ Normal(0, 1)
    end
    z = fill!(Array{Float64}(undef, length(data)), 0)
    for i = 0:1:(length(data))-1
        z[(i)+1] ~ Bernoulli(probability)
        data[(i)+1] ~ Normal(mu[(z[(i)+1])+1], 1)
    end
end"#;
    common::assert_lines_eq(expected, &translate(Backend::Turing, &gaussian_mixture_model()));
}

#[test]
fn gaussian_mixture_model_in_gen() {
    let expected = r#"using Gen
using Distributions
@gen function gaussian_mixture_model(data)
    number_of_clusters = 2
    probability = {"probability"} ~ uniform(0, 1)
    mu = fill!(Array{Float64}(undef, number_of_clusters), 0)
    for i = 0:1:(number_of_clusters)-1
        mu[(i)+1] = {"$("mu")[$(i)]"} ~ normal(0, 1)
    end
    z = fill!(Array{Float64}(undef, length(data)), 0)
    for i = 0:1:(length(data))-1
        z[(i)+1] = {"$("z")[$(i)]"} ~ bernoulli(probability)
        {"$("data")[$(i)]"} ~ normal(mu[(z[(i)+1])+1], 1)
    end
end"#;
    common::assert_lines_eq(expected, &translate(Backend::Gen, &gaussian_mixture_model()));
}

#[test]
fn unsupported_distributions_abort_the_run() {
    let tree = module(vec![model(
        "m",
        &[],
        vec![assign(
            name("k"),
            call("sample", vec![string("k"), call("HyperGeometric", vec![int(10), int(5), int(3)])]),
        )],
    )]);
    assert!(Backend::Pyro.translator().translate(&tree).is_none());
    assert!(Backend::Gen.translator().translate(&tree).is_none());
    let turing = Backend::Turing.translator().translate(&tree).unwrap();
    assert!(turing.contains("k ~ Hypergeometric(10, 5, 3)"));
}

#[test]
fn factor_has_no_turing_equivalent() {
    let tree = module(vec![model(
        "m",
        &["x"],
        vec![expression(call("factor", vec![name("x"), string("f")]))],
    )]);
    let error = Backend::Turing.translator().try_translate(&tree).unwrap_err();
    assert!(matches!(error, TranslationError::Mapping(ref mapping) if mapping.is_fatal()));
    assert_eq!(error.to_string(), "Turing doesn't provide an equivalent for `factor`.");
    let pyro = Backend::Pyro.translator().translate(&tree).unwrap();
    assert!(pyro.ends_with("    pyro.factor('f', x)"));
}

#[test]
fn unknown_calls_fall_back_and_the_rest_translates() {
    let tree = module(vec![model(
        "m",
        &["x"],
        vec![
            assign(name("y"), call("mystery", vec![name("x")])),
            assign(name("z"), call_with(attribute(name("np"), "abs"), vec![name("y")], vec![])),
            return_value(call("len", vec![name("z")])),
        ],
    )]);
    let translation = Backend::Turing.translator().translate(&tree).unwrap();
    assert_eq!(
        translation,
        "using Turing\n@model function m(x)\n    y = mystery(x)\n    z = np.abs(y)\n    return length(z)\nend"
    );
}

#[test]
fn repeated_preamble_requests_appear_once() {
    let categorical = |target: &str| {
        assign(
            name(target),
            call("sample", vec![string(target), call("Categorical", vec![name("p")])]),
        )
    };
    let tree = module(vec![model("m", &["p"], vec![categorical("a"), categorical("b")])]);
    let translation = Backend::Gen.translator().translate(&tree).unwrap();
    assert_eq!(translation.matches("@dist labeled_categorical").count(), 1);
    assert!(translation.contains("__categorical__context__unique_address_2 = p"));
    assert!(translation.contains(
        "b = {\"b\"} ~ labeled_categorical(0:length(__categorical__context__unique_address_2)-1, __categorical__context__unique_address_2)"
    ));
}

#[test]
fn turing_requires_targets_to_vary_like_addresses() {
    let tree = module(vec![model(
        "m",
        &["n"],
        vec![for_range(
            "i",
            vec![name("n")],
            vec![assign(
                name("x"),
                call(
                    "sample",
                    vec![
                        call("IndexedAddress", vec![string("x"), name("i")]),
                        call("Normal", vec![int(0), int(1)]),
                    ],
                ),
            )],
        )],
    )]);
    let error = Backend::Turing.translator().try_translate(&tree).unwrap_err();
    assert_eq!(
        error.to_string(),
        "The assignment variable's and address' complexity do not coincide: () versus ('i',)."
    );
}

#[test]
fn invalid_models_are_rejected_before_translation() {
    let tree = module(vec![model(
        "m",
        &[],
        vec![if_else(
            compare(name("a"), ComparisonOperator::In, name("b")),
            vec![pass()],
            vec![],
        )],
    )]);
    let error = Backend::Pyro
        .translator()
        .with_validation(pythia::validate)
        .try_translate(&tree)
        .unwrap_err();
    let TranslationError::Rejected(reasons) = error else {
        panic!("expected a rejection");
    };
    assert!(!reasons.is_empty());
    assert!(Backend::Pyro.translator().translate(&tree).is_some());
}
