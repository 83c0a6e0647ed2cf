use super::prelude::*;

#[derive(Default)]
pub struct FruitMutations;

#[Object]
impl FruitMutations {
    /// Create a fruit
    async fn create_fruit(
        &self,
        ctx: &Context<'_>,
        input: CreateFruitInput,
    ) -> Result<FruitResult> {
        let db = ctx.data::<Database>()?;
        let color_id = input.color_id.as_ref().map(parse_id).transpose().extend()?;

        let created = db
            .fruits()
            .create(CreateFruit {
                name: input.name,
                category: input.category,
                color_id,
            })
            .await;

        match created {
            Ok(fruit) => {
                tracing::info!(fruit_id = fruit.id, name = %fruit.name, "Created fruit");
                Ok(FruitResult::ok(fruit))
            }
            Err(e) if e.is_user_facing() => Ok(FruitResult::failed(e.to_string())),
            Err(e) => Err(e.extend()),
        }
    }

    /// Delete a fruit
    async fn delete_fruit(&self, ctx: &Context<'_>, id: ID) -> Result<MutationResult> {
        let db = ctx.data::<Database>()?;
        let id = parse_id(&id).extend()?;

        match db.fruits().delete(id).await {
            Ok(()) => {
                tracing::info!(fruit_id = id, "Deleted fruit");
                Ok(MutationResult::ok())
            }
            Err(e) if e.is_user_facing() => Ok(MutationResult::failed(e.to_string())),
            Err(e) => Err(e.extend()),
        }
    }
}
