use std::time::Duration;

use food_order::catalog::{self, AddAction, Catalog, Customization, Size, Topping};
use food_order::checkout::{CheckoutForm, Field};
use food_order::order::OrderRecord;
use food_order::tracking::TrackingSession;
use food_order::{Amount, Cart, Config, OrderStatus, Route};

fn fill_cart(catalog: &Catalog, cart: &mut Cart) {
    for id in ["m2", "m3"] {
        let item = catalog.find(id).unwrap();
        let draft = match catalog::resolve_add_action(item) {
            AddAction::DirectAdd => catalog::direct_draft(item),
            AddAction::OpenCustomization => {
                let mut customization = Customization::default();
                customization.select_size(Size::Large);
                customization.toggle_topping(Topping::ExtraCheese);
                customization.apply_to(item).unwrap()
            }
        };
        cart.add_item(draft, 1).unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn browse_order_and_track_to_delivery() {
    let config = Config {
        status_delay: Duration::from_secs(15),
        ..Config::default()
    };
    let catalog = Catalog::placeholder();
    let mut cart = Cart::with_config(&config);
    fill_cart(&catalog, &mut cart);

    // 13.99 customized pizza + 14.99 pepperoni
    assert_eq!(cart.totals().subtotal, Amount::from_float(28.98));

    let mut form = CheckoutForm::with_config(&config);
    form.set_payment_method("cod");
    assert!(form.submit().is_err());
    assert!(form.error(Field::DeliveryAddress).is_some());

    form.set_delivery_address("addr2");
    form.set_agree_to_terms(true);
    let checkout = form.submit().unwrap();

    let record = OrderRecord::place(&cart, checkout).unwrap();
    assert!(matches!(record.tracking_route(), Route::OrderTracking(id) if id == record.id));

    let mut session = TrackingSession::spawn(record.tracker(), config.status_delay);
    let mut last = session.snapshot();
    while let Ok(snapshot) = session.changed().await {
        assert!(snapshot.progress() >= last.progress());
        last = snapshot;
    }

    assert_eq!(last.status(), OrderStatus::Delivered);
    assert_eq!(last.timestamps().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn cancelled_order_stops_tracking() {
    let catalog = Catalog::placeholder();
    let mut cart = Cart::new();
    fill_cart(&catalog, &mut cart);

    let mut form = CheckoutForm::new();
    form.set_delivery_address("addr1");
    form.set_payment_method("paypal");
    form.set_agree_to_terms(true);
    let record = OrderRecord::place(&cart, form.submit().unwrap()).unwrap();

    let mut session = TrackingSession::spawn(record.tracker(), Duration::from_secs(15));
    let preparing = session.changed().await.unwrap();
    assert_eq!(preparing.status(), OrderStatus::Preparing);

    session.cancel().await.unwrap();
    assert_eq!(session.status(), OrderStatus::Cancelled);
    assert_eq!(session.snapshot().progress(), preparing.progress());
    assert!(session.changed().await.is_err());
}
