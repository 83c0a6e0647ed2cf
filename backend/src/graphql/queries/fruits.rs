use super::prelude::*;

#[derive(Default)]
pub struct FruitQueries;

#[Object]
impl FruitQueries {
    /// All fruits, ordered by id unless `orderBy` says otherwise
    async fn fruits(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "where")] filter: Option<FruitWhereInput>,
        order_by: Option<Vec<FruitOrderByInput>>,
        page: Option<PageInput>,
    ) -> Result<Vec<Fruit>> {
        let db = ctx.data::<Database>()?;

        let mut query = Fruit::query(db.pool()).order_by(order_by.unwrap_or_default());
        if let Some(filter) = filter {
            query = query.filter(filter);
        }
        if let Some(page) = page {
            query = query.paginate(page);
        }

        query.fetch_all().await.map_err(AppError::from).extend()
    }

    /// Get a fruit by ID
    async fn fruit(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Fruit>> {
        let db = ctx.data::<Database>()?;
        let id = parse_id(&id).extend()?;
        Fruit::get(db.pool(), id).await.map_err(AppError::from).extend()
    }
}
