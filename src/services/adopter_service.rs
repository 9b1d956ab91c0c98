use std::sync::Arc;

use log::info;

use crate::app_response::AppResponse;
use crate::environment::{Clock, IdGenerator};
use crate::local_db_model::{AdoptedPet, Adopter, NewAdoptedPet};
use crate::repository::Collection;
use crate::seed_data;
use crate::services::{ServiceContext, ADOPTED_PETS_KEY, ADOPTERS_KEY};

#[derive(Clone)]
pub struct AdopterService {
    adopters: Collection<Adopter>,
    pets: Collection<AdoptedPet>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl AdopterService {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self {
            adopters: ctx.collection(ADOPTERS_KEY, seed_data::default_adopters),
            pets: ctx.collection(ADOPTED_PETS_KEY, seed_data::default_adopted_pets),
            clock: Arc::clone(&ctx.clock),
            ids: Arc::clone(&ctx.ids),
        }
    }

    pub fn get_adopters(&self) -> Result<Vec<Adopter>, AppResponse> {
        self.adopters.load()
    }

    pub fn get_adopter(&self, id: &str) -> Result<Option<Adopter>, AppResponse> {
        self.adopters.find(id)
    }

    pub fn get_adopted_pets(&self, adopter_id: &str) -> Result<Vec<AdoptedPet>, AppResponse> {
        Ok(self
            .pets
            .load()?
            .into_iter()
            .filter(|pet| pet.adopter_id == adopter_id)
            .collect())
    }

    /// Stores the pet, then links it from the adopter record. The second write
    /// is separate from the first; a failure there leaves the pet unlinked.
    pub fn record_adoption(&self, new: NewAdoptedPet) -> Result<AdoptedPet, AppResponse> {
        new.validate()?;
        if self.adopters.find(&new.adopter_id)?.is_none() {
            return Err(AppResponse::NotFound(format!(
                "No adopter found with id: {}",
                new.adopter_id
            )));
        }

        let pet = AdoptedPet {
            id: self.ids.next_id("pet"),
            name: new.name,
            species: new.species,
            breed: new.breed,
            age: new.age,
            adopter_id: new.adopter_id,
            adoption_date: new.adoption_date.unwrap_or_else(|| self.clock.today()),
            shelter_name: new.shelter_name,
        };
        let pet = self.pets.append(pet)?;

        let pet_id = pet.id.clone();
        self.adopters.update(&pet.adopter_id, |adopter| {
            if !adopter.adopted_pets.contains(&pet_id) {
                adopter.adopted_pets.push(pet_id);
            }
            Ok(())
        })?;

        info!("Recorded adoption of {} by {}", pet.id, pet.adopter_id);
        Ok(pet)
    }
}
