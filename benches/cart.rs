use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use food_order::{Amount, Cart, CartCommand, ItemDraft};

/// Generates cart sessions for benchmarking.
///
/// Pattern per product (repeating):
/// 1. Add 1 unit
/// 2. Add 2 more units
/// 3. Set quantity to 1
///
/// Every `remove_every` products the oldest product is removed again.
pub struct CommandGenerator {
    products: u32,
    steps_per_product: u32,
    current_product: u32,
    current_step: u32,
    remove_every: u32,
    /// Removal queued behind the command that finished a product
    pending_remove: Option<CartCommand>,
}

impl CommandGenerator {
    pub fn new(products: u32, steps_per_product: u32, remove_every: u32) -> Self {
        Self {
            products,
            steps_per_product,
            current_product: 0,
            current_step: 0,
            remove_every,
            pending_remove: None,
        }
    }

    fn draft(product: u32) -> ItemDraft {
        ItemDraft::new(
            format!("p{product}"),
            format!("Product {product}"),
            Amount::from_cents(499 + i64::from(product % 1000)),
        )
    }
}

impl Iterator for CommandGenerator {
    type Item = CartCommand;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(remove) = self.pending_remove.take() {
            return Some(remove);
        }

        if self.current_product >= self.products {
            return None;
        }

        let product = self.current_product;
        let command = match self.current_step % 3 {
            0 => CartCommand::Add {
                item: Self::draft(product),
                quantity: 1,
            },
            1 => CartCommand::Add {
                item: Self::draft(product),
                quantity: 2,
            },
            _ => CartCommand::SetQuantity {
                id: format!("p{product}"),
                quantity: 1,
            },
        };

        self.current_step += 1;
        if self.current_step >= self.steps_per_product {
            self.current_step = 0;
            self.current_product += 1;
            if self.remove_every > 0 && self.current_product % self.remove_every == 0 {
                self.pending_remove = Some(CartCommand::Remove {
                    id: format!("p{}", self.current_product - self.remove_every),
                });
            }
        }

        Some(command)
    }
}

fn bench_small_carts(c: &mut Criterion) {
    let mut group = c.benchmark_group("small_carts");

    for products in [5u32, 20, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(products), &products, |b, &products| {
            b.iter(|| {
                let mut cart = Cart::new();
                for command in CommandGenerator::new(products, 3, 0) {
                    let _ = black_box(cart.apply(command));
                }
                black_box(cart.totals())
            });
        });
    }

    group.finish();
}

fn bench_with_removals(c: &mut Criterion) {
    let mut group = c.benchmark_group("with_removals");

    group.bench_function("500_products_remove_every_10", |b| {
        b.iter(|| {
            let mut cart = Cart::new();
            for command in CommandGenerator::new(500, 3, 10) {
                let _ = black_box(cart.apply(command));
            }
            cart
        });
    });

    group.finish();
}

fn bench_totals(c: &mut Criterion) {
    let mut group = c.benchmark_group("totals");

    for products in [10u32, 100, 1_000] {
        let mut cart = Cart::new();
        for command in CommandGenerator::new(products, 1, 0) {
            let _ = cart.apply(command);
        }
        group.bench_with_input(BenchmarkId::from_parameter(products), &cart, |b, cart| {
            b.iter(|| black_box(cart.totals()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_small_carts, bench_with_removals, bench_totals);
criterion_main!(benches);
