//! Demo data set
//!
//! Two tenants with users, a small catalog, stock and a few orders. Ids are
//! fixed so the CLI walkthrough can refer to them:
//! - `ent_demo_ferreteria` (TCP hardware shop)
//! - `ent_demo_bodega` (MyPime grocery)

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    Category, CustomerDetails, Entity, EntityType, Order, OrderItem, OrderStatus, Product,
    Supplier, UnitOfMeasure, User, UserRole, WarehouseLocation,
};

use super::memory::StoreSnapshot;

pub const DEMO_HARDWARE_ENTITY: &str = "ent_demo_ferreteria";
pub const DEMO_GROCERY_ENTITY: &str = "ent_demo_bodega";

/// Generate the demo tenants
pub fn generate_demo_entities() -> Vec<Entity> {
    let mut hardware = Entity::new(DEMO_HARDWARE_ENTITY, "Ferretería Central", EntityType::Tcp);
    hardware.exchange_rate = Decimal::new(120, 0);
    hardware.is_store_enabled = true;
    hardware.store_slug = Some("ferreteria-central".to_string());
    hardware.store_price_markup = Some(Decimal::new(15, 0));

    let mut grocery = Entity::new(DEMO_GROCERY_ENTITY, "Bodega La Esquina", EntityType::MyPime);
    grocery.exchange_rate = Decimal::new(120, 0);

    vec![hardware, grocery]
}

fn demo_users() -> Vec<User> {
    vec![
        User::new(
            "user_demo_1",
            DEMO_HARDWARE_ENTITY,
            "María Pérez",
            "maria@ferreteria.example",
            UserRole::Admin,
        )
        .as_admin(),
        User::new(
            "user_demo_2",
            DEMO_HARDWARE_ENTITY,
            "José Díaz",
            "jose@ferreteria.example",
            UserRole::Warehouse,
        ),
        User::new(
            "user_demo_3",
            DEMO_GROCERY_ENTITY,
            "Ana Gómez",
            "ana@bodega.example",
            UserRole::Admin,
        )
        .as_admin(),
    ]
}

fn demo_catalog() -> (Vec<Category>, Vec<Supplier>) {
    let categories = vec![
        Category::new("cat_demo_1", DEMO_HARDWARE_ENTITY, "Herramientas"),
        Category::new("cat_demo_2", DEMO_HARDWARE_ENTITY, "Pinturas"),
        Category::new("cat_demo_3", DEMO_GROCERY_ENTITY, "Víveres"),
    ];
    let suppliers = vec![
        Supplier::new("sup_demo_1", DEMO_HARDWARE_ENTITY, "Importadora del Caribe"),
        Supplier::new("sup_demo_2", DEMO_GROCERY_ENTITY, "Granja El Sol"),
    ];
    (categories, suppliers)
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    entity_id: &str,
    name: &str,
    price_cents: i64,
    quantity: f64,
    unit: UnitOfMeasure,
    category_id: &str,
    supplier_id: &str,
    days_ago: i64,
) -> Product {
    let mut product = Product::new(id, entity_id, name, Decimal::new(price_cents, 2), quantity);
    product.unit_of_measure = unit;
    product.category_id = Some(category_id.to_string());
    product.supplier_id = Some(supplier_id.to_string());
    product.added_date = Utc::now() - Duration::days(days_ago);
    product.location = WarehouseLocation {
        warehouse_type: "Principal".to_string(),
        section: "A".to_string(),
        row: format!("{}", (days_ago % 5) + 1),
    };
    product.reorder_point = Some(5.0);
    product
}

/// Generate demo stock for both tenants
pub fn generate_demo_products() -> Vec<Product> {
    let h = DEMO_HARDWARE_ENTITY;
    let g = DEMO_GROCERY_ENTITY;
    vec![
        product("prod_demo_1", h, "Martillo de carpintero", 1250, 24.0, UnitOfMeasure::Units, "cat_demo_1", "sup_demo_1", 90),
        product("prod_demo_2", h, "Destornillador plano", 450, 60.0, UnitOfMeasure::Units, "cat_demo_1", "sup_demo_1", 75),
        product("prod_demo_3", h, "Pintura blanca", 1899, 40.0, UnitOfMeasure::Liters, "cat_demo_2", "sup_demo_1", 30),
        product("prod_demo_4", g, "Arroz", 210, 350.0, UnitOfMeasure::Kilograms, "cat_demo_3", "sup_demo_2", 12),
        product("prod_demo_5", g, "Aceite vegetal", 520, 80.0, UnitOfMeasure::Liters, "cat_demo_3", "sup_demo_2", 8),
    ]
}

/// Generate demo orders referencing the demo users and products
pub fn generate_demo_orders() -> Vec<Order> {
    let mut delivered = Order::new(
        "ord_demo_1",
        DEMO_HARDWARE_ENTITY,
        "user_demo_2",
        vec![
            OrderItem::new("prod_demo_1", 2.0),
            OrderItem::new("prod_demo_3", 1.0),
        ],
        Decimal::new(4399, 2),
    );
    delivered.status = OrderStatus::Delivered;
    delivered.order_date = Utc::now() - Duration::days(14);
    delivered.customer_details = Some(CustomerDetails {
        name: "Carlos".to_string(),
        last_name: "Rodríguez".to_string(),
        address: "Calle 23 #456".to_string(),
        email: "carlos@example.com".to_string(),
        id_card: "85010112345".to_string(),
    });

    let pending = Order::new(
        "ord_demo_2",
        DEMO_HARDWARE_ENTITY,
        "user_demo_1",
        vec![OrderItem::new("prod_demo_2", 10.0)],
        Decimal::new(4500, 2),
    );

    let mut processing = Order::new(
        "ord_demo_3",
        DEMO_GROCERY_ENTITY,
        "user_demo_3",
        vec![
            OrderItem::new("prod_demo_4", 25.0),
            OrderItem::new("prod_demo_5", 4.0),
        ],
        Decimal::new(7330, 2),
    );
    processing.status = OrderStatus::Processing;

    vec![delivered, pending, processing]
}

/// The complete demo store
pub fn generate_demo_snapshot() -> StoreSnapshot {
    let (categories, suppliers) = demo_catalog();
    StoreSnapshot {
        entities: generate_demo_entities(),
        users: demo_users(),
        products: generate_demo_products(),
        orders: generate_demo_orders(),
        categories,
        suppliers,
    }
}
