use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_order::aggregate::{
    Order, OrderId, OrderPatch, OrderStatus, PaymentType,
};
use contracts::enums::marketplace_type::MarketplaceType;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::OrderStore;
use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub order_id: String,
    pub account: String,
    pub order_date: i64,
    pub customer_name: String,
    pub amount: f64,
    pub payment_type: String,
    pub status: String,
    pub state: String,
    pub rto: bool,
    pub replacement: bool,
    pub delivered_date: Option<i64>,
    pub synced_from_amazon: bool,
    pub synced_from_flipkart: bool,
    pub last_sync_date: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(m: Model) -> Self {
        let account = MarketplaceType::from_code(&m.account).unwrap_or(if m.synced_from_amazon {
            MarketplaceType::Amazon
        } else {
            MarketplaceType::Flipkart
        });
        let status = OrderStatus::parse(&m.status).unwrap_or_else(|| {
            tracing::warn!("Unknown status '{}' on order {}", m.status, m.id);
            OrderStatus::Pending
        });

        Order {
            id: Uuid::parse_str(&m.id).ok().map(OrderId::new),
            user_id: m.user_id,
            order_id: m.order_id,
            account,
            date: m.order_date,
            customer_name: m.customer_name,
            amount: m.amount,
            payment_type: PaymentType::parse(&m.payment_type),
            status,
            state: m.state,
            rto: m.rto,
            replacement: m.replacement,
            delivered_date: m.delivered_date,
            synced_from_amazon: m.synced_from_amazon,
            synced_from_flipkart: m.synced_from_flipkart,
            last_sync_date: m.last_sync_date,
        }
    }
}

fn to_active_model(id: &str, order: &Order) -> ActiveModel {
    ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(order.user_id.clone()),
        order_id: Set(order.order_id.clone()),
        account: Set(order.account.display_name().to_string()),
        order_date: Set(order.date),
        customer_name: Set(order.customer_name.clone()),
        amount: Set(order.amount),
        payment_type: Set(order.payment_type.as_str().to_string()),
        status: Set(order.status.as_str().to_string()),
        state: Set(order.state.clone()),
        rto: Set(order.rto),
        replacement: Set(order.replacement),
        delivered_date: Set(order.delivered_date),
        synced_from_amazon: Set(order.synced_from_amazon),
        synced_from_flipkart: Set(order.synced_from_flipkart),
        last_sync_date: Set(order.last_sync_date),
        created_at: sea_orm::ActiveValue::NotSet,
        updated_at: Set(Some(Utc::now())),
        version: sea_orm::ActiveValue::NotSet,
    }
}

pub async fn list_by_user(db: &DatabaseConnection, user_id: &str) -> Result<Vec<Order>> {
    let models = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::OrderDate)
        .all(db)
        .await?;
    Ok(models.into_iter().map(|m| m.into()).collect())
}

pub async fn insert_order(db: &DatabaseConnection, order: &Order) -> Result<Uuid> {
    let uuid = Uuid::new_v4();

    let mut active_model = to_active_model(&uuid.to_string(), order);
    active_model.created_at = Set(Some(Utc::now()));
    active_model.version = Set(1);

    Entity::insert(active_model).exec(db).await?;
    Ok(uuid)
}

pub async fn update_order(db: &DatabaseConnection, id: Uuid, patch: &OrderPatch) -> Result<()> {
    let id_str = id.to_string();

    let model = Entity::find_by_id(&id_str)
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Order {} not found", id_str))?;
    let version = model.version;

    let mut order: Order = model.into();
    patch.apply(&mut order);

    let mut active_model = to_active_model(&id_str, &order);
    active_model.version = Set(version + 1);
    Entity::update(active_model).exec(db).await?;
    Ok(())
}

/// `OrderStore` backed by the global SQLite connection
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderRepository;

#[async_trait]
impl OrderStore for OrderRepository {
    async fn query(&self, user_id: &str) -> Result<Vec<Order>> {
        list_by_user(get_connection(), user_id).await
    }

    async fn insert(&self, order: &Order) -> Result<OrderId> {
        insert_order(get_connection(), order).await.map(OrderId::new)
    }

    async fn update(&self, id: OrderId, patch: &OrderPatch) -> Result<()> {
        update_order(get_connection(), id.value(), patch).await
    }
}
